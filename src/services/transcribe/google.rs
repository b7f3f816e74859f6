//! Google Speech-to-Text transcription adapter.

use super::retry::{RetryConfig, retry_with_backoff};
use super::Transcriber;
use crate::error::{SubSyncError, SubSyncResult};
use crate::services::audio::PcmSegment;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

/// Calls the Google Cloud Speech-to-Text `speech:recognize` endpoint with
/// a base64-encoded LINEAR16 PCM segment.
pub struct GoogleSpeechTranscriber {
    client: reqwest::Client,
    api_key: String,
    retry_config: RetryConfig,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognizeResult>,
}

#[derive(Debug, Deserialize)]
struct RecognizeResult {
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    transcript: String,
}

impl GoogleSpeechTranscriber {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            retry_config: RetryConfig::default(),
        }
    }

    async fn call_once(&self, pcm: &PcmSegment) -> SubSyncResult<String> {
        let bytes: Vec<u8> = pcm.samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let body = json!({
            "config": {
                "encoding": "LINEAR16",
                "sampleRateHertz": pcm.sample_rate,
                "languageCode": "en-US",
            },
            "audio": {
                "content": BASE64.encode(&bytes),
            }
        });

        let response = self
            .client
            .post("https://speech.googleapis.com/v1/speech:recognize")
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| SubSyncError::RetryableApiError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SubSyncError::AuthError("Google rejected the API key".into()));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SubSyncError::QuotaExceeded("Google Speech quota exceeded".into()));
        }
        if status.is_server_error() {
            return Err(SubSyncError::RetryableApiError(format!("server error: {status}")));
        }
        if !status.is_success() {
            return Err(SubSyncError::RetryableApiError(format!("unexpected status: {status}")));
        }

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| SubSyncError::RetryableApiError(format!("response decode error: {e}")))?;

        let text = parsed
            .results
            .into_iter()
            .filter_map(|r| r.alternatives.into_iter().next())
            .map(|a| a.transcript)
            .collect::<Vec<_>>()
            .join(" ");
        Ok(text)
    }
}

#[async_trait]
impl Transcriber for GoogleSpeechTranscriber {
    async fn transcribe(&self, pcm: &PcmSegment) -> SubSyncResult<String> {
        let raw = retry_with_backoff(self.retry_config, || self.call_once(pcm)).await?;
        Ok(super::clean(&raw))
    }
}
