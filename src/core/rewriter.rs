//! Rewriter (component H).
//!
//! Applies an offset function to every subtitle entry, clamps timestamps
//! non-negative, and enforces a minimum cue duration.

use crate::core::estimator::OffsetFunction;
use crate::core::subtitle::{Subtitle, SubtitleEntry};
use std::time::Duration;

/// Minimum cue duration after correction, in seconds.
pub const MIN_CUE_DURATION_SECS: f64 = 0.5;

/// Apply `offset` to every entry in `subtitle`, returning a new corrected
/// subtitle. Cue text, index numbering, and entry order are preserved
/// exactly; only timestamps change.
pub fn rewrite(subtitle: &Subtitle, offset: &OffsetFunction) -> Subtitle {
    let entries = subtitle
        .entries
        .iter()
        .map(|entry| rewrite_entry(entry, offset))
        .collect();
    Subtitle { entries }
}

fn rewrite_entry(entry: &SubtitleEntry, offset: &OffsetFunction) -> SubtitleEntry {
    let start_secs = entry.start.as_secs_f64();
    let end_secs = entry.end.as_secs_f64();

    let corrected_start = (start_secs + offset.eval(start_secs)).max(0.0);
    let corrected_end = (end_secs + offset.eval(end_secs)).max(corrected_start + MIN_CUE_DURATION_SECS);

    SubtitleEntry {
        index: entry.index,
        start: Duration::from_secs_f64(corrected_start),
        end: Duration::from_secs_f64(corrected_end),
        text: entry.text.clone(),
    }
}
