//! Subtitle Model (component B).
//!
//! Parses and serializes SRT — the only format this crate supports — and
//! builds the minute-bucket index the Aligner searches against.

use crate::core::text::normalize;
use crate::error::{SubSyncError, SubSyncResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Minimum normalized length, in characters, for a minute bucket to be
/// eligible for alignment.
pub const MIN_CHARS_DEFAULT: usize = 40;

/// A single subtitle cue: 1-based index, start/end time, and untouched cue
/// text. Read-only after parse except for its timestamps at rewrite time.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
    pub text: String,
}

/// An ordered, parsed subtitle track.
#[derive(Debug, Clone, Default)]
pub struct Subtitle {
    pub entries: Vec<SubtitleEntry>,
}

/// Parse an SRT file at `path`. Fails with [`SubSyncError::UnsupportedFormat`]
/// if the extension isn't `.srt`, or [`SubSyncError::ParseError`] at the
/// first malformed entry.
pub fn parse(path: &Path) -> SubSyncResult<Subtitle> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_lowercase();
    if ext != "srt" {
        return Err(SubSyncError::unsupported_format(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_str(&content, path)
}

/// Parse SRT content already read into memory. Aborts on the first
/// malformed block (truncated block, unparseable index, or a timestamp
/// line that doesn't match `HH:MM:SS,mmm --> HH:MM:SS,mmm`) with
/// [`SubSyncError::ParseError`] naming the block's 1-based source line.
pub fn parse_str(content: &str, path: &Path) -> SubSyncResult<Subtitle> {
    let time_regex =
        Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})")
            .expect("static regex is valid");

    // Normalize CRLF up front so block-splitting on a blank line works the
    // same regardless of the file's line-ending convention; this doesn't
    // shift line numbers since it never changes how many lines there are.
    let content = content.replace("\r\n", "\n");
    let path_str = path.display().to_string();
    let mut entries = Vec::new();
    let mut line_no = 1usize;

    for block in content.split("\n\n") {
        let block_line = line_no;
        line_no += block.lines().count() + 1;

        if block.trim().is_empty() {
            continue;
        }
        let lines: Vec<&str> = block.lines().collect();
        if lines.len() < 3 {
            return Err(SubSyncError::parse_error(
                &path_str,
                block_line,
                "entry is missing its timestamp or text line",
            ));
        }
        let index: usize = lines[0].trim().parse().map_err(|e| {
            SubSyncError::parse_error(&path_str, block_line, format!("invalid index: {e}"))
        })?;
        let caps = time_regex.captures(lines[1]).ok_or_else(|| {
            SubSyncError::parse_error(
                &path_str,
                block_line + 1,
                format!("malformed timestamp line: {}", lines[1]),
            )
        })?;
        let start = parse_time(&caps, 1, &path_str, block_line + 1)?;
        let end = parse_time(&caps, 5, &path_str, block_line + 1)?;
        let text = lines[2..].join("\n");
        entries.push(SubtitleEntry {
            index,
            start,
            end,
            text,
        });
    }
    Ok(Subtitle { entries })
}

/// Serialize a [`Subtitle`] back to SRT text, renumbering entries
/// sequentially and formatting timestamps `HH:MM:SS,mmm`.
pub fn serialize(subtitle: &Subtitle) -> String {
    let mut out = String::new();
    for (i, entry) in subtitle.entries.iter().enumerate() {
        out.push_str(&format!("{}\n", i + 1));
        out.push_str(&format!(
            "{} --> {}\n",
            format_time(entry.start),
            format_time(entry.end)
        ));
        out.push_str(&entry.text);
        out.push_str("\n\n");
    }
    out
}

fn parse_time(
    caps: &regex::Captures,
    start_group: usize,
    path: &str,
    line: usize,
) -> SubSyncResult<Duration> {
    let parse_u64 = |i: usize| -> SubSyncResult<u64> {
        caps[i]
            .parse()
            .map_err(|e| SubSyncError::parse_error(path, line, format!("invalid timestamp: {e}")))
    };
    let hours = parse_u64(start_group)?;
    let minutes = parse_u64(start_group + 1)?;
    let seconds = parse_u64(start_group + 2)?;
    let millis = parse_u64(start_group + 3)?;
    Ok(Duration::from_millis(
        hours * 3_600_000 + minutes * 60_000 + seconds * 1000 + millis,
    ))
}

fn format_time(d: Duration) -> String {
    let total_ms = d.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// The minute-bucket index: normalized, space-joined cue text for every
/// whole minute that has at least one subtitle entry starting in it.
#[derive(Debug, Clone, Default)]
pub struct MinuteIndex {
    buckets: BTreeMap<u32, String>,
    min_chars: usize,
}

impl MinuteIndex {
    /// Build the index from a parsed subtitle, using `min_chars` as the
    /// eligibility threshold for [`MinuteIndex::is_eligible`].
    pub fn build(subtitle: &Subtitle, min_chars: usize) -> Self {
        let mut grouped: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for entry in &subtitle.entries {
            let minute = (entry.start.as_secs() / 60) as u32;
            let normalized = normalize(&entry.text);
            if normalized.is_empty() {
                continue;
            }
            grouped.entry(minute).or_default().push(normalized);
        }
        let buckets = grouped
            .into_iter()
            .map(|(m, parts)| (m, parts.join(" ")))
            .collect();
        Self { buckets, min_chars }
    }

    /// Raw bucket text for minute `m`, if any subtitle entry starts in it.
    pub fn bucket(&self, m: u32) -> Option<&str> {
        self.buckets.get(&m).map(String::as_str)
    }

    /// Whether the bucket at minute `m` exists and meets the minimum
    /// character threshold.
    pub fn is_eligible(&self, m: u32) -> bool {
        self.buckets
            .get(&m)
            .is_some_and(|b| b.chars().count() >= self.min_chars)
    }

    /// Eligible bucket keys within `[m_lo, m_hi]`, inclusive.
    pub fn entries_between(&self, m_lo: u32, m_hi: u32) -> Vec<u32> {
        self.buckets
            .range(m_lo..=m_hi)
            .filter(|(_, text)| text.chars().count() >= self.min_chars)
            .map(|(m, _)| *m)
            .collect()
    }
}
