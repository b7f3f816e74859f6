//! Production [`AudioExtractor`] backed by symphonia for decode and rubato
//! for resampling, tolerating recoverable `DecodeError`/`ResetRequired`
//! mid-stream and treating `IoError` at EOF as a clean stream end.

use super::{AudioExtractor, PcmSegment, TARGET_SAMPLE_RATE, dsp};
use crate::error::{SubSyncError, SubSyncResult};
use async_trait::async_trait;
use log::warn;
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::units::Time;

/// Decodes a windowed slice of a media file and resamples it to 16 kHz mono.
pub struct SymphoniaAudioExtractor;

impl SymphoniaAudioExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SymphoniaAudioExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioExtractor for SymphoniaAudioExtractor {
    async fn extract(&self, path: &Path, t_start: f64, duration: f64) -> SubSyncResult<PcmSegment> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || decode_window(&path, t_start, duration))
            .await
            .map_err(|e| SubSyncError::extraction_failed(t_start, format!("task join error: {e}")))?
    }
}

fn decode_window(path: &Path, t_start: f64, duration: f64) -> SubSyncResult<PcmSegment> {
    let file = File::open(path)
        .map_err(|e| SubSyncError::extraction_failed(t_start, format!("cannot open {}: {e}", path.display())))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let probed = symphonia::default::get_probe()
        .format(&Default::default(), mss, &Default::default(), &Default::default())
        .map_err(|e| SubSyncError::extraction_failed(t_start, format!("format probe error: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| SubSyncError::extraction_failed(t_start, "no audio track found"))?
        .clone();

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
    let channels = track
        .codec_params
        .channel_layout
        .map(|l| l.into_channels().count())
        .unwrap_or(1)
        .max(1);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &Default::default())
        .map_err(|e| SubSyncError::extraction_failed(t_start, format!("decoder error: {e}")))?;

    if t_start > 0.0 {
        format
            .seek(
                SeekMode::Accurate,
                SeekTo::Time {
                    time: Time::from(t_start),
                    track_id: Some(track.id),
                },
            )
            .map_err(|e| SubSyncError::extraction_failed(t_start, format!("seek failed: {e}")))?;
    }

    let max_frames = (duration * sample_rate as f64).ceil() as u64;
    let mut mono: Vec<f32> = Vec::with_capacity(max_frames as usize);

    loop {
        if mono.len() as u64 >= max_frames {
            break;
        }
        match format.next_packet() {
            Ok(packet) => match decoder.decode(&packet) {
                Ok(audio_buf) => {
                    let mut sample_buf =
                        SampleBuffer::<f32>::new(audio_buf.capacity() as u64, *audio_buf.spec());
                    sample_buf.copy_interleaved_ref(audio_buf);
                    for frame in sample_buf.samples().chunks(channels) {
                        let mixed = frame.iter().sum::<f32>() / channels as f32;
                        mono.push(mixed);
                        if mono.len() as u64 >= max_frames {
                            break;
                        }
                    }
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    warn!("decode error, skipping packet: {e}");
                    continue;
                }
                Err(SymphoniaError::ResetRequired) => {
                    warn!("decoder reset required mid-extraction");
                    continue;
                }
                Err(other) => {
                    return Err(SubSyncError::extraction_failed(
                        t_start,
                        format!("unrecoverable decode error: {other}"),
                    ));
                }
            },
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(e) => {
                return Err(SubSyncError::extraction_failed(t_start, format!("packet read error: {e}")));
            }
        }
    }

    if mono.is_empty() {
        return Err(SubSyncError::extraction_failed(t_start, "no audio decoded in window"));
    }

    let mut resampled = if sample_rate == TARGET_SAMPLE_RATE {
        mono
    } else {
        resample_to_target(&mono, sample_rate)?
    };

    dsp::process(&mut resampled, TARGET_SAMPLE_RATE);

    let samples: Vec<i16> = resampled
        .iter()
        .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect();

    Ok(PcmSegment {
        samples,
        sample_rate: TARGET_SAMPLE_RATE,
    })
}

fn resample_to_target(input: &[f32], input_rate: u32) -> SubSyncResult<Vec<f32>> {
    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };
    let ratio = TARGET_SAMPLE_RATE as f64 / input_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, input.len(), 1)
        .map_err(|e| SubSyncError::extraction_failed(0.0, format!("resampler init error: {e}")))?;
    let output = resampler
        .process(&[input.to_vec()], None)
        .map_err(|e| SubSyncError::extraction_failed(0.0, format!("resample error: {e}")))?;
    Ok(output.into_iter().next().unwrap_or_default())
}
