//! Comprehensive error types for the subsync-cli application operations.
//!
//! This module defines the `SubSyncError` enum covering all error conditions
//! that can occur while sampling audio, transcribing it, aligning against a
//! subtitle's minute index, estimating an offset function, and rewriting
//! timestamps.
//!
//! It also provides helper methods to construct errors and generate
//! user-friendly messages.
use thiserror::Error;

/// Represents all possible errors in the subsync-cli application.
///
/// Each variant provides specific context to facilitate debugging and
/// user-friendly reporting.
///
/// # Exit Codes
///
/// Each error variant maps to an exit code via `SubSyncError::exit_code`.
#[derive(Error, Debug)]
pub enum SubSyncError {
    /// I/O operation failed during file system access.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad CLI invocation: missing/conflicting flags, invalid values.
    #[error("Usage error: {0}")]
    Usage(String),

    /// Subtitle file extension or content is not the supported SRT format.
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),

    /// SRT content doesn't parse (malformed timestamp, missing block, etc).
    #[error("Subtitle parse error in {path} at line {line}: {message}")]
    ParseError {
        /// Path of the subtitle file that failed to parse.
        path: String,
        /// 1-based source line where the malformed entry starts.
        line: usize,
        /// Description of the parse failure.
        message: String,
    },

    /// Audio extraction adapter could not produce a PCM segment.
    #[error("Audio extraction failed at t={time_s:.1}s: {message}")]
    ExtractionFailed {
        /// Sample start time, in seconds, that the extraction targeted.
        time_s: f64,
        /// Description of the extraction failure.
        message: String,
    },

    /// Transcription API call failed in a way worth retrying (timeout, 5xx).
    #[error("Transcription API error (retryable): {0}")]
    RetryableApiError(String),

    /// Transcription API rejected credentials.
    #[error("Transcription API authentication failed: {0}")]
    AuthError(String),

    /// Transcription API quota or rate limit exhausted.
    #[error("Transcription API quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Alignment pass produced too few matches to estimate an offset.
    #[error(
        "Insufficient alignment matches: {found}/{required} required (similarity threshold {threshold:.2})"
    )]
    InsufficientMatches {
        /// Number of confident matches actually found.
        found: usize,
        /// Minimum number of matches required to proceed.
        required: usize,
        /// Similarity threshold matches were judged against.
        threshold: f32,
    },

    /// Invariant that should be unreachable was violated; a bug, not user error.
    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    /// Catch-all error variant wrapping any other failure.
    #[error("Unknown error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Specialized `Result` type for subsync-cli operations.
pub type SubSyncResult<T> = Result<T, SubSyncError>;

impl SubSyncError {
    /// Create a usage error with the given message.
    pub fn usage<S: Into<String>>(message: S) -> Self {
        SubSyncError::Usage(message.into())
    }

    /// Create an unsupported-format error for the given path.
    pub fn unsupported_format<S: Into<String>>(path: S) -> Self {
        SubSyncError::UnsupportedFormat(path.into())
    }

    /// Create a parse error for the given path, 1-based source line, and reason.
    pub fn parse_error<S1, S2>(path: S1, line: usize, message: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        SubSyncError::ParseError {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Create an extraction-failed error for the given sample time and reason.
    pub fn extraction_failed<S: Into<String>>(time_s: f64, message: S) -> Self {
        SubSyncError::ExtractionFailed {
            time_s,
            message: message.into(),
        }
    }

    /// Create an insufficient-matches error.
    pub fn insufficient_matches(found: usize, required: usize, threshold: f32) -> Self {
        SubSyncError::InsufficientMatches {
            found,
            required,
            threshold,
        }
    }

    /// Return the corresponding exit code for this error variant.
    pub fn exit_code(&self) -> i32 {
        match self {
            SubSyncError::Usage(_) => 2,
            SubSyncError::UnsupportedFormat(_) | SubSyncError::ParseError { .. } => 3,
            SubSyncError::InsufficientMatches { .. } => 4,
            SubSyncError::ExtractionFailed { .. }
            | SubSyncError::RetryableApiError(_)
            | SubSyncError::AuthError(_)
            | SubSyncError::QuotaExceeded(_) => 5,
            SubSyncError::Io(_) | SubSyncError::InternalInvariant(_) | SubSyncError::Other(_) => 1,
        }
    }

    /// Return a user-friendly error message with suggested remedies.
    pub fn user_friendly_message(&self) -> String {
        match self {
            SubSyncError::Io(e) => format!("File operation error: {}", e),
            SubSyncError::Usage(m) => format!("Invalid usage: {}\nHint: run --help", m),
            SubSyncError::UnsupportedFormat(path) => format!(
                "{} is not a supported subtitle format\nHint: only .srt is supported",
                path
            ),
            SubSyncError::ParseError { path, line, message } => format!(
                "Could not parse {} at line {}: {}\nHint: check the subtitle's timestamp formatting",
                path, line, message
            ),
            SubSyncError::ExtractionFailed { time_s, message } => format!(
                "Could not extract audio near {:.1}s: {}\nHint: verify the media file is readable and has an audio track",
                time_s, message
            ),
            SubSyncError::RetryableApiError(m) => format!(
                "Transcription service is unavailable: {}\nHint: check network connectivity and try again",
                m
            ),
            SubSyncError::AuthError(m) => format!(
                "Authentication failed: {}\nHint: check the configured API key",
                m
            ),
            SubSyncError::QuotaExceeded(m) => format!(
                "API quota exceeded: {}\nHint: wait for quota reset or switch providers with --api",
                m
            ),
            SubSyncError::InsufficientMatches {
                found,
                required,
                threshold,
            } => format!(
                "Only found {found} of {required} required confident matches (similarity >= {threshold:.2}); subtitle left unmodified"
            ),
            SubSyncError::InternalInvariant(m) => {
                format!("Internal error, please report: {}", m)
            }
            SubSyncError::Other(err) => {
                format!("Unknown error: {}\nHint: please report this issue", err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_error_exit_code_is_two() {
        let err = SubSyncError::usage("missing --media");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn unsupported_format_exit_code_is_three() {
        let err = SubSyncError::unsupported_format("movie.ass");
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("movie.ass"));
    }

    #[test]
    fn insufficient_matches_exit_code_is_four() {
        let err = SubSyncError::insufficient_matches(2, 5, 0.65);
        assert_eq!(err.exit_code(), 4);
        assert!(err.user_friendly_message().contains("2 of 5"));
    }

    #[test]
    fn extraction_failed_exit_code_is_five() {
        let err = SubSyncError::extraction_failed(120.0, "seek past EOF");
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let converted: SubSyncError = io_error.into();
        assert!(matches!(converted, SubSyncError::Io(_)));
        assert_eq!(converted.exit_code(), 1);
    }
}
