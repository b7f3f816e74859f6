//! Synchronizer (component I): orchestrates the Sampler, Audio Extraction
//! Adapter, Transcription Adapter, Aligner, and Offset Estimator, with
//! adaptive-threshold and multi-pass refinement control.

use crate::core::aligner::{self, AlignmentMatch, AudioSample};
use crate::core::estimator::{self, OffsetFunction};
use crate::core::rewriter;
use crate::core::sampler;
use crate::core::subtitle::{MinuteIndex, Subtitle};
use crate::error::{SubSyncError, SubSyncResult};
use crate::services::audio::AudioExtractor;
use crate::services::transcribe::Transcriber;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Default sample count when the caller doesn't override it.
pub const DEFAULT_SAMPLES: usize = 16;
/// Default similarity threshold for the initial alignment pass.
pub const DEFAULT_THRESHOLD: f32 = 0.65;
/// Default search window, in minutes.
pub const DEFAULT_WINDOW_MINUTES: u32 = 20;
/// Default minute-bucket eligibility threshold, in characters.
pub const DEFAULT_MIN_CHARS: usize = 40;
/// Bounded fan-out for concurrent extraction/transcription.
const FAN_OUT: usize = 4;

/// Tuning parameters for a synchronization run; defaults match the values
/// above, CLI flags override individual fields.
#[derive(Debug, Clone)]
pub struct SyncParams {
    pub samples: usize,
    pub threshold: f32,
    pub window_minutes: u32,
    pub min_chars: usize,
    pub seed: u64,
}

impl Default for SyncParams {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            threshold: DEFAULT_THRESHOLD,
            window_minutes: DEFAULT_WINDOW_MINUTES,
            min_chars: DEFAULT_MIN_CHARS,
            seed: 0,
        }
    }
}

/// Outcome of a full synchronization run.
pub struct SyncOutcome {
    pub corrected: Subtitle,
    pub offset_fn: OffsetFunction,
    pub residual_std_dev: f64,
    pub passes: u32,
    pub matches: Vec<AlignmentMatch>,
}

/// Orchestrates A-H over a media file and subtitle path.
pub struct Synchronizer {
    extractor: Arc<dyn AudioExtractor>,
    transcriber: Arc<dyn Transcriber>,
}

impl Synchronizer {
    pub fn new(extractor: Arc<dyn AudioExtractor>, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            extractor,
            transcriber,
        }
    }

    /// Run the full pipeline: sample, extract, transcribe, align, estimate,
    /// rewrite. `duration_sec` must already be resolved by the caller (CLI
    /// layer applies the TV/film fallback heuristic, which is explicitly
    /// out of core scope per spec).
    pub async fn run(
        &self,
        media_path: &Path,
        subtitle: &Subtitle,
        duration_sec: f64,
        params: &SyncParams,
    ) -> SubSyncResult<SyncOutcome> {
        let index = MinuteIndex::build(subtitle, params.min_chars);

        let candidate_times = sampler::pick(duration_sec, usize::MAX, params.seed);
        let initial_times = sampler::pick(duration_sec, params.samples, params.seed);

        let initial_samples = self
            .collect_samples(media_path, &initial_times, &candidate_times, params.seed)
            .await;

        let mut threshold = params.threshold;
        let mut matches = aligner::align(
            &initial_samples,
            &index,
            params.window_minutes,
            threshold,
            params.min_chars,
        );
        let mut passes = 1;

        let n = initial_samples.len().max(1);
        let mut success_rate = matches.len() as f64 / n as f64;

        let floor = if params.samples >= 24 { 0.35 } else { 0.40 };
        if success_rate < 0.4 {
            for k in 1..=2u32 {
                let candidate_threshold = (params.threshold - 0.10 * k as f32).max(floor as f32);
                threshold = candidate_threshold;
                matches = aligner::align(
                    &initial_samples,
                    &index,
                    params.window_minutes,
                    threshold,
                    params.min_chars,
                );
                success_rate = matches.len() as f64 / n as f64;
                if success_rate >= 0.4 || threshold <= floor as f32 {
                    break;
                }
            }
        }

        matches.sort_by(|a, b| a.start_time.partial_cmp(&b.start_time).unwrap());
        let (mut offset_fn, mut std_dev) = estimator::estimate(&matches);

        if (0.25..=0.6).contains(&success_rate) && std_dev > 3.0 {
            let refine_n = ((params.samples as f64) * 1.5).ceil() as usize;
            let refine_threshold = (threshold - 0.05).max(0.0);
            let refine_seed = params.seed.wrapping_add(1);
            let refine_times = sampler::pick(duration_sec, refine_n, refine_seed);

            let refine_samples = self
                .collect_samples(media_path, &refine_times, &candidate_times, refine_seed)
                .await;
            let refine_matches = aligner::align(
                &refine_samples,
                &index,
                params.window_minutes,
                refine_threshold,
                params.min_chars,
            );

            let merged = merge_matches(&matches, &refine_matches);
            let mut merged_sorted = merged.clone();
            merged_sorted.sort_by(|a, b| a.start_time.partial_cmp(&b.start_time).unwrap());
            let (merged_fn, merged_std_dev) = estimator::estimate(&merged_sorted);

            if merged_std_dev <= std_dev * 0.8 {
                matches = merged_sorted;
                offset_fn = merged_fn;
                std_dev = merged_std_dev;
                passes = 2;
            }
            // else: rollback, keep the first-pass result.
        }

        if matches.is_empty() {
            return Err(SubSyncError::insufficient_matches(0, 1, threshold));
        }

        let corrected = rewriter::rewrite(subtitle, &offset_fn);

        Ok(SyncOutcome {
            corrected,
            offset_fn,
            residual_std_dev: std_dev,
            passes,
            matches,
        })
    }

    /// Extract and transcribe `times` concurrently up to [`FAN_OUT`],
    /// retrying a failed extraction once at a different candidate time.
    async fn collect_samples(
        &self,
        media_path: &Path,
        times: &[f64],
        candidate_pool: &[f64],
        seed: u64,
    ) -> Vec<AudioSample> {
        let semaphore = Arc::new(Semaphore::new(FAN_OUT));
        let progress = crate::cli::ui::create_progress_bar(times.len() as u64);
        let tasks: Vec<_> = times
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let semaphore = semaphore.clone();
                let extractor = self.extractor.clone();
                let transcriber = self.transcriber.clone();
                let media_path = media_path.to_path_buf();
                let progress = progress.clone();
                let alternates: Vec<f64> = candidate_pool
                    .iter()
                    .copied()
                    .filter(|c| (c - t).abs() > f64::EPSILON)
                    .collect();
                let retry_seed = seed.wrapping_add(i as u64);

                tokio::spawn(async move {
                    let _permit = semaphore.acquire().await.expect("semaphore not closed");
                    let sample = extract_and_transcribe(
                        extractor.as_ref(),
                        transcriber.as_ref(),
                        &media_path,
                        i,
                        t,
                        &alternates,
                        retry_seed,
                    )
                    .await;
                    progress.inc(1);
                    sample
                })
            })
            .collect();

        let results = futures::future::join_all(tasks).await;
        progress.finish_and_clear();
        results
            .into_iter()
            .filter_map(|r| r.ok())
            .collect()
    }
}

async fn extract_and_transcribe(
    extractor: &dyn AudioExtractor,
    transcriber: &dyn Transcriber,
    media_path: &Path,
    sample_index: usize,
    t_start: f64,
    alternates: &[f64],
    retry_seed: u64,
) -> AudioSample {
    let duration = crate::core::sampler::SAMPLE_DURATION_SECS;
    let mut actual_t = t_start;
    let mut pcm = extractor.extract(media_path, t_start, duration).await;

    if pcm.is_err() {
        if let Some(alt) = sampler::pick_one(alternates, retry_seed) {
            actual_t = alt;
            pcm = extractor.extract(media_path, alt, duration).await;
        }
    }

    let transcript = match pcm {
        Ok(segment) => transcriber.transcribe(&segment).await.ok(),
        Err(_) => None,
    };

    AudioSample {
        sample_index,
        start_time: actual_t,
        transcript,
    }
}

/// Merge two match lists, deduplicating by sample start time within 30 s
/// and keeping the higher-similarity entry.
fn merge_matches(a: &[AlignmentMatch], b: &[AlignmentMatch]) -> Vec<AlignmentMatch> {
    let mut merged: Vec<AlignmentMatch> = a.to_vec();
    for candidate in b {
        let duplicate_idx = merged
            .iter()
            .position(|m| (m.start_time - candidate.start_time).abs() <= 30.0);
        match duplicate_idx {
            Some(idx) => {
                if candidate.similarity > merged[idx].similarity {
                    merged[idx] = candidate.clone();
                }
            }
            None => merged.push(candidate.clone()),
        }
    }
    merged
}
