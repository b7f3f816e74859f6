//! Command-line interface for the subsync-cli subtitle synchronization tool.
//!
//! This is a single-purpose CLI: there is no subcommand dispatch — every
//! flag controls one synchronization run.
//!
//! # Examples
//!
//! ```bash
//! subsync-cli --media movie.mkv --sub movie.srt --api whisper
//! ```

mod args;
pub mod ui;

pub use args::SyncArgs;
use clap::Parser;

/// Top-level CLI argument structure.
#[derive(Parser, Debug)]
#[command(name = "subsync-cli")]
#[command(about = "Corrects subtitle timing drift using AI transcription of sampled audio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(flatten)]
    pub args: SyncArgs,
}

/// Executes the subsync-cli application with parsed arguments.
pub async fn run() -> crate::Result<()> {
    let cli = Cli::parse();
    crate::commands::sync_command::execute(cli.args).await
}
