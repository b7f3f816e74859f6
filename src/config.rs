//! Layered configuration: built-in defaults, an optional TOML file, then
//! environment variables, in that precedence order.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SubSyncError, SubSyncResult};

/// Which transcription backend to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    Whisper,
    Google,
}

impl Default for ApiProvider {
    fn default() -> Self {
        ApiProvider::Whisper
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeConfig {
    pub provider: ApiProvider,
    pub openai_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub whisper_base_url: String,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            provider: ApiProvider::default(),
            openai_api_key: None,
            google_api_key: None,
            whisper_base_url: "https://api.openai.com/v1".to_string(),
            retry_attempts: 3,
            retry_base_delay_ms: 2000,
        }
    }
}

/// Synchronizer tuning settings (defaults match spec.md §9's resolved
/// open questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub default_samples: usize,
    pub sample_duration_s: f64,
    pub search_window_minutes: u32,
    pub similarity_threshold: f32,
    pub min_chars: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_samples: 16,
            sample_duration_s: 20.0,
            search_window_minutes: 20,
            similarity_threshold: 0.65,
            min_chars: 40,
        }
    }
}

/// Top-level merged configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transcribe: TranscribeConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

impl Config {
    /// Load defaults, then overlay an optional TOML config file, then
    /// overlay environment variables. `config_path` is the explicit
    /// `--config` CLI override, if any; otherwise `~/.config/subsync-cli/config.toml`
    /// is used if present.
    pub fn load(config_path: Option<&Path>) -> SubSyncResult<Self> {
        let mut cfg = Config::default();

        let resolved_path = config_path
            .map(PathBuf::from)
            .or_else(Self::default_config_path);

        if let Some(path) = resolved_path {
            if path.exists() {
                let text = std::fs::read_to_string(&path)?;
                cfg = toml::from_str(&text).map_err(|e| {
                    SubSyncError::usage(format!(
                        "failed to parse config file {}: {e}",
                        path.display()
                    ))
                })?;
            }
        }

        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("subsync-cli").join("config.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.transcribe.openai_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("GOOGLE_PLACES_API_KEY") {
            self.transcribe.google_api_key = Some(key);
        }
    }
}
