//! Audio Extraction Adapter (component D, external collaborator).
//!
//! Thin contract over the demuxer: `extract(path, t_start, duration) -> PCM`.
//! Implemented with symphonia for decode and rubato for resampling to the
//! fixed 16 kHz mono output this crate's transcription adapters expect.

mod dsp;
mod extractor;

pub use extractor::SymphoniaAudioExtractor;

use crate::error::SubSyncResult;
use async_trait::async_trait;

/// Fixed output sample rate all extracted segments are resampled to.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// A windowed, preprocessed PCM segment: 16 kHz mono signed 16-bit samples.
#[derive(Debug, Clone)]
pub struct PcmSegment {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

/// External-boundary contract for audio extraction. Any type implementing
/// this qualifies — no runtime type checks, matching the dynamic-dispatch
/// convention used for the transcription adapter.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    /// Extract `duration` seconds of audio starting at `t_start` from the
    /// media at `path`, returning a preprocessed 16 kHz mono PCM segment.
    async fn extract(&self, path: &std::path::Path, t_start: f64, duration: f64) -> SubSyncResult<PcmSegment>;
}
