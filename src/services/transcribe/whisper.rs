//! OpenAI Whisper transcription adapter: encodes a PCM segment to WAV and
//! uploads it as multipart form data.

use super::retry::{RetryConfig, retry_with_backoff};
use super::Transcriber;
use crate::error::{SubSyncError, SubSyncResult};
use crate::services::audio::PcmSegment;
use async_trait::async_trait;
use serde::Deserialize;

/// Calls the OpenAI `audio/transcriptions` endpoint with a WAV-encoded PCM
/// segment and returns its `text` field.
pub struct OpenAiWhisperTranscriber {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    retry_config: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: String,
}

impl OpenAiWhisperTranscriber {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            retry_config: RetryConfig::default(),
        }
    }

    fn encode_wav(pcm: &PcmSegment) -> SubSyncResult<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: pcm.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let dir = tempfile::tempdir()
            .map_err(|e| SubSyncError::RetryableApiError(format!("tempdir error: {e}")))?;
        let path = dir.path().join("segment.wav");
        {
            let mut writer = hound::WavWriter::create(&path, spec)
                .map_err(|e| SubSyncError::RetryableApiError(format!("wav encode error: {e}")))?;
            for sample in &pcm.samples {
                writer
                    .write_sample(*sample)
                    .map_err(|e| SubSyncError::RetryableApiError(format!("wav encode error: {e}")))?;
            }
            writer
                .finalize()
                .map_err(|e| SubSyncError::RetryableApiError(format!("wav encode error: {e}")))?;
        }
        std::fs::read(&path).map_err(|e| SubSyncError::RetryableApiError(format!("wav read error: {e}")))
    }

    async fn call_once(&self, pcm: &PcmSegment) -> SubSyncResult<String> {
        let wav_bytes = Self::encode_wav(pcm)?;
        let part = reqwest::multipart::Part::bytes(wav_bytes)
            .file_name("segment.wav")
            .mime_str("audio/wav")
            .map_err(|e| SubSyncError::RetryableApiError(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", "whisper-1");

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubSyncError::RetryableApiError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SubSyncError::AuthError("OpenAI rejected the API key".into()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SubSyncError::QuotaExceeded("OpenAI rate limit exceeded".into()));
        }
        if status.is_server_error() {
            return Err(SubSyncError::RetryableApiError(format!("server error: {status}")));
        }
        if !status.is_success() {
            return Err(SubSyncError::RetryableApiError(format!("unexpected status: {status}")));
        }

        let parsed: WhisperResponse = response
            .json()
            .await
            .map_err(|e| SubSyncError::RetryableApiError(format!("response decode error: {e}")))?;
        Ok(parsed.text)
    }
}

#[async_trait]
impl Transcriber for OpenAiWhisperTranscriber {
    async fn transcribe(&self, pcm: &PcmSegment) -> SubSyncResult<String> {
        let raw = retry_with_backoff(self.retry_config, || self.call_once(pcm)).await?;
        Ok(super::clean(&raw))
    }
}
