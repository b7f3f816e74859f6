//! Transcription Adapter (component E, external collaborator).
//!
//! `transcribe(pcm) -> text`. Modeled as a capability — any type
//! implementing [`Transcriber`] qualifies, using dynamic dispatch so
//! callers don't need to know which backend they hold. Two concrete
//! variants (cloud Whisper, cloud Speech) plus a mock for tests.

pub mod google;
pub mod retry;
pub mod whisper;

pub use google::GoogleSpeechTranscriber;
pub use whisper::OpenAiWhisperTranscriber;

use crate::core::text::normalize;
use crate::error::SubSyncResult;
use crate::services::audio::PcmSegment;
use async_trait::async_trait;

/// External-boundary contract for speech-to-text transcription.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe `pcm` to text. Implementations apply their own retry
    /// policy and distinguish `RetryableApiError` from `AuthError`/
    /// `QuotaExceeded` per the adapter contract.
    async fn transcribe(&self, pcm: &PcmSegment) -> SubSyncResult<String>;
}

/// Run the adapter's raw output back through the Text Normalizer so
/// transcripts and subtitle cues are compared in the same canonical form.
pub fn clean(raw: &str) -> String {
    normalize(raw)
}
