//! Glue between the parsed CLI arguments and [`Synchronizer`].

use crate::cli::SyncArgs;
use crate::cli::ui;
use crate::config::{ApiProvider, Config};
use crate::core::sampler;
use crate::core::subtitle;
use crate::core::synchronizer::{SyncParams, Synchronizer};
use crate::error::{SubSyncError, SubSyncResult};
use crate::services::audio::SymphoniaAudioExtractor;
use crate::services::transcribe::{GoogleSpeechTranscriber, OpenAiWhisperTranscriber, Transcriber};
use std::sync::Arc;

/// Execute a synchronization run from parsed CLI arguments.
pub async fn execute(args: SyncArgs) -> SubSyncResult<()> {
    if !args.media.exists() {
        return Err(SubSyncError::usage(format!(
            "media file not found: {}",
            args.media.display()
        )));
    }

    let config = Config::load(args.config.as_deref())?;
    let subtitle = subtitle::parse(&args.sub)?;

    let transcriber: Arc<dyn Transcriber> = build_transcriber(&args, &config)?;
    let extractor = Arc::new(SymphoniaAudioExtractor::new());

    let duration_sec = args
        .duration
        .unwrap_or(sampler::FALLBACK_DURATION_FILM_SECS);

    let params = SyncParams {
        samples: args.samples.unwrap_or(config.sync.default_samples),
        threshold: args
            .similarity_threshold
            .unwrap_or(config.sync.similarity_threshold),
        window_minutes: args
            .search_window
            .unwrap_or(config.sync.search_window_minutes),
        min_chars: args.min_chars.unwrap_or(config.sync.min_chars),
        seed: 0,
    };

    if args.debug {
        log::debug!(
            "sync params: samples={} threshold={:.2} window={}m min_chars={}",
            params.samples,
            params.threshold,
            params.window_minutes,
            params.min_chars
        );
    }

    let synchronizer = Synchronizer::new(extractor, transcriber);
    let outcome = synchronizer
        .run(&args.media, &subtitle, duration_sec, &params)
        .await?;

    ui::report(
        &outcome.matches,
        &outcome.offset_fn,
        outcome.residual_std_dev,
        outcome.passes,
        args.dry_run,
    );

    if args.dry_run {
        return Ok(());
    }

    let timestamp = iso8601_now();
    crate::backup::backup_before_write(&args.sub, &timestamp)?;

    let output_path = corrected_path(&args.sub);
    let serialized = subtitle::serialize(&outcome.corrected);
    std::fs::write(&output_path, serialized)?;

    ui::print_success(&format!(
        "wrote corrected subtitle to {}",
        output_path.display()
    ));
    Ok(())
}

fn build_transcriber(args: &SyncArgs, config: &Config) -> SubSyncResult<Arc<dyn Transcriber>> {
    match args.api {
        ApiProvider::Whisper => {
            let key = config.transcribe.openai_api_key.clone().ok_or_else(|| {
                SubSyncError::usage("OPENAI_API_KEY is required when --api whisper is selected")
            })?;
            Ok(Arc::new(OpenAiWhisperTranscriber::new(
                config.transcribe.whisper_base_url.clone(),
                key,
            )))
        }
        ApiProvider::Google => {
            let key = config.transcribe.google_api_key.clone().ok_or_else(|| {
                SubSyncError::usage("GOOGLE_PLACES_API_KEY is required when --api google is selected")
            })?;
            Ok(Arc::new(GoogleSpeechTranscriber::new(key)))
        }
    }
}

fn corrected_path(sub_path: &std::path::Path) -> std::path::PathBuf {
    let stem = sub_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("subtitle");
    sub_path.with_file_name(format!("{stem}.corrected.srt"))
}

fn iso8601_now() -> String {
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    // Minimal UTC civil-from-days conversion, avoiding a chrono dependency
    // for a single timestamp-suffix string.
    let days = secs / 86_400;
    let secs_of_day = secs % 86_400;
    let (year, month, day) = civil_from_days(days as i64);
    format!(
        "{year:04}-{month:02}-{day:02}T{:02}-{:02}-{:02}Z",
        secs_of_day / 3600,
        (secs_of_day % 3600) / 60,
        secs_of_day % 60
    )
}

/// Howard Hinnant's `civil_from_days` algorithm (days since 1970-01-01 to
/// a proleptic-Gregorian y/m/d), public-domain.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrected_path_uses_suffix() {
        let path = std::path::PathBuf::from("/tmp/movie.srt");
        assert_eq!(
            corrected_path(&path),
            std::path::PathBuf::from("/tmp/movie.corrected.srt")
        );
    }

    #[test]
    fn civil_from_days_epoch_is_1970_01_01() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
    }

    #[test]
    fn civil_from_days_known_date() {
        // 2026-07-31 is 20,665 days after the epoch.
        assert_eq!(civil_from_days(20_665), (2026, 7, 31));
    }
}
