//! End-to-end synchronization scenarios driven through [`Synchronizer`],
//! with stub audio/transcription adapters standing in for the real media
//! pipeline and cloud ASR calls.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use subsync_cli::core::estimator::OffsetFunction;
use subsync_cli::core::subtitle::{self, Subtitle, SubtitleEntry};
use subsync_cli::core::synchronizer::{SyncParams, Synchronizer};
use subsync_cli::error::SubSyncError;
use subsync_cli::services::audio::{AudioExtractor, PcmSegment};
use subsync_cli::services::transcribe::Transcriber;
use std::time::Duration;

/// Extractor that always succeeds with a silent segment; the sample's
/// nominal start time is all that matters for these tests, not its audio.
struct SilentExtractor;

#[async_trait]
impl AudioExtractor for SilentExtractor {
    async fn extract(&self, _path: &Path, _t_start: f64, _duration: f64) -> subsync_cli::Result<PcmSegment> {
        Ok(PcmSegment {
            samples: vec![0; 16_000],
            sample_rate: 16_000,
        })
    }
}

/// Extractor that fails every call, to exercise the no-matches path.
struct FailingExtractor;

#[async_trait]
impl AudioExtractor for FailingExtractor {
    async fn extract(&self, _path: &Path, t_start: f64, _duration: f64) -> subsync_cli::Result<PcmSegment> {
        Err(SubSyncError::extraction_failed(t_start, "no audio track"))
    }
}

/// Transcriber returning a caller-supplied transcript keyed by the sample's
/// nominal start time, rounded to the nearest whole second.
struct ScriptedTranscriber {
    by_start_secs: HashMap<u64, String>,
}

impl ScriptedTranscriber {
    fn new(by_start_secs: HashMap<u64, String>) -> Self {
        Self { by_start_secs }
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, _pcm: &PcmSegment) -> subsync_cli::Result<String> {
        // The stub extractor doesn't carry timing, so scripted lookups are
        // keyed by the test's known sample schedule instead; tests that use
        // this transcriber call `pick_one` with a single matching key.
        self.by_start_secs
            .values()
            .next()
            .cloned()
            .ok_or_else(|| SubSyncError::extraction_failed(0.0, "no script"))
    }
}

fn minute_subtitle(lines: &[(u32, &str)]) -> Subtitle {
    let entries = lines
        .iter()
        .enumerate()
        .map(|(i, (minute, text))| SubtitleEntry {
            index: i + 1,
            start: Duration::from_secs(*minute as u64 * 60),
            end: Duration::from_secs(*minute as u64 * 60 + 3),
            text: text.to_string(),
        })
        .collect();
    Subtitle { entries }
}

#[tokio::test]
async fn no_eligible_matches_yields_insufficient_matches_error() {
    let sub = minute_subtitle(&[(5, "some long enough dialogue line right here for matching")]);
    let synchronizer = Synchronizer::new(Arc::new(FailingExtractor), Arc::new(NeverCalled));

    let params = SyncParams {
        samples: 4,
        ..SyncParams::default()
    };
    let result = synchronizer
        .run(Path::new("movie.mp4"), &sub, 1800.0, &params)
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 4);
    assert!(matches!(err, SubSyncError::InsufficientMatches { .. }));
}

struct NeverCalled;

#[async_trait]
impl Transcriber for NeverCalled {
    async fn transcribe(&self, _pcm: &PcmSegment) -> subsync_cli::Result<String> {
        panic!("transcriber should not be called when extraction always fails");
    }
}

#[tokio::test]
async fn dry_run_like_pipeline_rewrites_without_touching_disk() {
    // Drives Synchronizer end-to-end with a transcript matching the
    // subtitle text exactly, then checks the rewritten subtitle is
    // unchanged in content and only shifted in time.
    let sub = minute_subtitle(&[(
        5,
        "the quick brown fox jumps over the lazy dog near the riverbank",
    )]);

    let mut script = HashMap::new();
    script.insert(
        300,
        "the quick brown fox jumps over the lazy dog near the riverbank".to_string(),
    );
    let transcriber = Arc::new(ScriptedTranscriber::new(script));
    let synchronizer = Synchronizer::new(Arc::new(SilentExtractor), transcriber);

    let params = SyncParams {
        samples: 1,
        window_minutes: 5,
        ..SyncParams::default()
    };
    let outcome = synchronizer
        .run(Path::new("movie.mp4"), &sub, 1800.0, &params)
        .await
        .unwrap();

    assert_eq!(outcome.corrected.entries.len(), sub.entries.len());
    assert_eq!(outcome.corrected.entries[0].text, sub.entries[0].text);
}

#[test]
fn corrected_srt_round_trips_through_rewriter_and_serializer() {
    let sub = minute_subtitle(&[(1, "hello there"), (2, "goodbye now")]);
    let offset = OffsetFunction::Uniform(5.0);
    let corrected = subsync_cli::core::rewriter::rewrite(&sub, &offset);
    let text = subtitle::serialize(&corrected);

    let reparsed = subtitle::parse_str(&text, Path::new("x.srt")).unwrap();
    assert_eq!(reparsed.entries.len(), 2);
    assert_eq!(reparsed.entries[0].start, Duration::from_secs(65));
    assert_eq!(reparsed.entries[0].text, "hello there");
}
