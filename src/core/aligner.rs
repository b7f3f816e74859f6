//! Aligner (component F).
//!
//! Slides each transcript against candidate minute buckets within a window
//! around its nominal sample time, scoring by normalized Levenshtein edit
//! distance, and keeps the best match above threshold.

use crate::core::subtitle::MinuteIndex;

/// A single audio sample drawn by the Sampler, with its transcript filled
/// in by the Transcription Adapter.
#[derive(Debug, Clone)]
pub struct AudioSample {
    pub sample_index: usize,
    pub start_time: f64,
    pub transcript: Option<String>,
}

/// An accepted alignment between a sample's transcript and a subtitle
/// minute bucket.
#[derive(Debug, Clone)]
pub struct AlignmentMatch {
    pub sample_index: usize,
    pub start_time: f64,
    pub minute: u32,
    pub similarity: f32,
    pub subtitle_text: String,
    pub ai_text: String,
}

/// Margin by which a closer candidate must beat the current best to keep
/// searching instead of early-exiting once a match clears `threshold`.
const EARLY_EXIT_MARGIN: f32 = 0.05;

/// Run alignment for every sample that has a transcript, against `index`,
/// searching within `window` minutes of each sample's nominal minute at or
/// above `threshold` similarity. Unmatched samples are dropped. Output is
/// not pre-sorted by caller convention — callers that need start-time
/// ordering (the estimator does) sort explicitly.
pub fn align(
    samples: &[AudioSample],
    index: &MinuteIndex,
    window: u32,
    threshold: f32,
    min_chars: usize,
) -> Vec<AlignmentMatch> {
    samples
        .iter()
        .filter_map(|s| align_one(s, index, window, threshold, min_chars))
        .collect()
}

fn align_one(
    sample: &AudioSample,
    index: &MinuteIndex,
    window: u32,
    threshold: f32,
    min_chars: usize,
) -> Option<AlignmentMatch> {
    let transcript = sample.transcript.as_deref()?;
    let m0 = (sample.start_time / 60.0).floor() as i64;
    let lo = (m0 - window as i64).max(0) as u32;
    let hi = (m0 + window as i64).max(0) as u32;

    let mut candidates: Vec<u32> = (lo..=hi).collect();
    candidates.sort_by_key(|m| ((*m as i64 - m0).unsigned_abs(), *m));

    let mut best_similarity = 0.0f32;
    let mut best_minute: Option<u32> = None;
    let mut best_text = String::new();

    for m in candidates {
        let Some(bucket) = index.bucket(m) else {
            continue;
        };
        if bucket.chars().count() < min_chars {
            continue;
        }
        let similarity = similarity_score(transcript, bucket);

        if similarity > best_similarity {
            best_similarity = similarity;
            best_minute = Some(m);
            best_text = bucket.to_string();
        }

        // Candidates are visited in increasing distance from m0, so any
        // later candidate can at best score 1.0. Stop once the current
        // best clears threshold and a perfect farther match couldn't beat
        // it by the early-exit margin.
        if best_similarity >= threshold && 1.0 - best_similarity < EARLY_EXIT_MARGIN {
            break;
        }
    }

    let minute = best_minute?;
    if best_similarity < threshold {
        return None;
    }
    if index.bucket(minute).map(|b| b.chars().count()).unwrap_or(0) < min_chars {
        return None;
    }

    Some(AlignmentMatch {
        sample_index: sample.sample_index,
        start_time: sample.start_time,
        minute,
        similarity: best_similarity,
        subtitle_text: best_text,
        ai_text: transcript.to_string(),
    })
}

/// `1 - lev(a, b) / max(|a|, |b|)`, in `[0, 1]`.
pub fn similarity_score(a: &str, b: &str) -> f32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let max_len = a_chars.len().max(b_chars.len());
    if max_len == 0 {
        return 1.0;
    }
    let dist = levenshtein(&a_chars, &b_chars);
    1.0 - (dist as f32 / max_len as f32)
}

/// Classic O(n*m) dynamic-programming edit distance, single-row rolling.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::subtitle::{MinuteIndex, Subtitle, SubtitleEntry};
    use std::time::Duration;

    fn index_with_buckets(buckets: &[(u32, &str)]) -> MinuteIndex {
        let entries: Vec<SubtitleEntry> = buckets
            .iter()
            .enumerate()
            .map(|(i, (minute, text))| SubtitleEntry {
                index: i + 1,
                start: Duration::from_secs(*minute as u64 * 60),
                end: Duration::from_secs(*minute as u64 * 60 + 2),
                text: text.to_string(),
            })
            .collect();
        MinuteIndex::build(&Subtitle { entries }, 10)
    }

    #[test]
    fn levenshtein_identical_strings_is_zero() {
        let a: Vec<char> = "hello world".chars().collect();
        let b: Vec<char> = "hello world".chars().collect();
        assert_eq!(levenshtein(&a, &b), 0);
    }

    #[test]
    fn similarity_of_identical_text_is_one() {
        assert!((similarity_score("same text here", "same text here") - 1.0).abs() < 1e-6);
    }

    #[test]
    fn exact_match_within_window_is_accepted() {
        let index = index_with_buckets(&[(5, "the quick brown fox jumps over the lazy dog today")]);
        let samples = vec![AudioSample {
            sample_index: 0,
            start_time: 300.0,
            transcript: Some("the quick brown fox jumps over the lazy dog today".to_string()),
        }];
        let matches = align(&samples, &index, 20, 0.65, 10);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].minute, 5);
        assert!(matches[0].similarity > 0.99);
    }

    #[test]
    fn below_threshold_is_dropped() {
        let index = index_with_buckets(&[(5, "completely unrelated subtitle content over here")]);
        let samples = vec![AudioSample {
            sample_index: 0,
            start_time: 300.0,
            transcript: Some("nothing like that at all honestly".to_string()),
        }];
        let matches = align(&samples, &index, 20, 0.65, 10);
        assert!(matches.is_empty());
    }

    #[test]
    fn ineligible_bucket_is_skipped() {
        let index = index_with_buckets(&[(5, "short")]);
        let samples = vec![AudioSample {
            sample_index: 0,
            start_time: 300.0,
            transcript: Some("short".to_string()),
        }];
        let matches = align(&samples, &index, 20, 0.65, 40);
        assert!(matches.is_empty());
    }

    #[test]
    fn window_clamps_at_minute_zero() {
        let index = index_with_buckets(&[(0, "near the very start of the recording right here")]);
        let samples = vec![AudioSample {
            sample_index: 0,
            start_time: 5.0,
            transcript: Some("near the very start of the recording right here".to_string()),
        }];
        let matches = align(&samples, &index, 20, 0.65, 10);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].minute, 0);
    }

    #[test]
    fn unmatched_samples_without_transcript_are_dropped() {
        let index = index_with_buckets(&[(5, "some text that is long enough to be eligible here")]);
        let samples = vec![AudioSample {
            sample_index: 0,
            start_time: 300.0,
            transcript: None,
        }];
        assert!(align(&samples, &index, 20, 0.65, 10).is_empty());
    }
}
