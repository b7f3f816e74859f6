//! Argument surface for the subsync-cli command.

use crate::config::ApiProvider;
use clap::Args;
use std::path::PathBuf;

/// Corrects subtitle/video timing drift using AI transcription of sampled audio.
#[derive(Args, Debug, Clone)]
pub struct SyncArgs {
    /// Path to the video/media file to sample audio from.
    #[arg(long)]
    pub media: PathBuf,

    /// Path to the SRT subtitle file to correct.
    #[arg(long)]
    pub sub: PathBuf,

    /// Transcription backend to use.
    #[arg(long, value_enum, default_value_t = ApiProvider::Whisper)]
    pub api: ApiProvider,

    /// Number of audio samples to draw for the initial alignment pass.
    #[arg(long)]
    pub samples: Option<usize>,

    /// Minutes of subtitle index to search around each sample's nominal time.
    #[arg(long)]
    pub search_window: Option<u32>,

    /// Minimum normalized-text similarity for a candidate match to count.
    #[arg(long)]
    pub similarity_threshold: Option<f32>,

    /// Minimum normalized character count for a minute bucket to be eligible.
    #[arg(long)]
    pub min_chars: Option<usize>,

    /// Optional override for the media's duration, in seconds, when the
    /// demuxer can't report one directly.
    #[arg(long)]
    pub duration: Option<f64>,

    /// Path to an optional TOML configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Emit verbose per-sample diagnostics.
    #[arg(long)]
    pub debug: bool,

    /// Compute and report the correction without writing the subtitle file.
    #[arg(long)]
    pub dry_run: bool,
}
