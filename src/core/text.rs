//! Text Normalizer (component A).
//!
//! Produces a canonicalized comparison string from subtitle cue text or a
//! transcript: strips markup and bracketed asides, lowercases, and collapses
//! whitespace. Pure function of the input string — no I/O, no state.

use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)|\*[^*]*\*").unwrap());
static VTT_CUE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^NOTE.*$|^WEBVTT.*$").unwrap());
static SPEAKER_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[A-Z][A-Z0-9 _-]{1,30}:").unwrap());
static ORNAMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[♪♫★☆]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize subtitle/transcript text for alignment comparison.
///
/// Operations are applied in this order: strip HTML-style tags, strip
/// bracketed/parenthesized/asterisked asides, strip WebVTT cue-style
/// prefixes, strip speaker-label lines, strip musical/ornament symbols,
/// lowercase, collapse whitespace, trim. Idempotent: `normalize(normalize(x))
/// == normalize(x)`.
pub fn normalize(input: &str) -> String {
    let s = HTML_TAG.replace_all(input, " ");
    let s = BRACKETED.replace_all(&s, " ");
    let s = VTT_CUE_PREFIX.replace_all(&s, " ");
    let s = SPEAKER_LABEL.replace_all(&s, " ");
    let s = ORNAMENT.replace_all(&s, " ");
    let s = s.to_lowercase();
    let s = WHITESPACE.replace_all(&s, " ");
    s.trim().to_string()
}

/// Strip hearing-impaired cues (`[...]`, `(...)`) from display text, as an
/// opt-in pass distinct from [`normalize`]. Unlike `normalize`, this is meant
/// to be applied to cue text a caller wants to *display*, not just compare —
/// the Rewriter never calls this automatically, since rewritten cue text
/// must remain byte-identical to the source.
pub fn strip_sdh(input: &str) -> String {
    let s = BRACKETED.replace_all(input, "");
    WHITESPACE.replace_all(s.trim(), " ").to_string()
}
