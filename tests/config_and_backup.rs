//! Config layering (defaults -> file -> env) and the backup-before-write
//! collaborator, exercised against real temp files rather than unit-level
//! mocks.

use std::io::Write;
use subsync_cli::backup::backup_before_write;
use subsync_cli::config::Config;

#[test]
fn toml_file_overrides_defaults_and_env_overrides_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    let mut f = std::fs::File::create(&config_path).unwrap();
    write!(
        f,
        r#"
[transcribe]
provider = "google"
google_api_key = "from-file"
whisper_base_url = "https://api.openai.com/v1"
retry_attempts = 3
retry_base_delay_ms = 2000

[sync]
default_samples = 20
sample_duration_s = 20.0
search_window_minutes = 15
similarity_threshold = 0.7
min_chars = 40
"#
    )
    .unwrap();

    let cfg = Config::load(Some(&config_path)).unwrap();
    assert_eq!(cfg.sync.default_samples, 20);
    assert_eq!(cfg.sync.search_window_minutes, 15);
    assert_eq!(cfg.transcribe.google_api_key.as_deref(), Some("from-file"));

    unsafe {
        std::env::set_var("GOOGLE_PLACES_API_KEY", "from-env");
    }
    let cfg_with_env = Config::load(Some(&config_path)).unwrap();
    assert_eq!(
        cfg_with_env.transcribe.google_api_key.as_deref(),
        Some("from-env")
    );
    unsafe {
        std::env::remove_var("GOOGLE_PLACES_API_KEY");
    }
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let cfg = Config::load(Some(std::path::Path::new(
        "/definitely/not/a/real/path/config.toml",
    )))
    .unwrap();
    assert_eq!(cfg.sync.min_chars, 40);
    assert_eq!(cfg.sync.default_samples, 16);
}

#[test]
fn backup_is_created_alongside_original_before_any_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let sub_path = dir.path().join("episode.srt");
    std::fs::write(
        &sub_path,
        "1\n00:00:01,000 --> 00:00:03,000\nOriginal line.\n\n",
    )
    .unwrap();

    let backup_path = backup_before_write(&sub_path, "2026-07-31T12-00-00Z").unwrap();

    assert!(backup_path.exists());
    assert!(sub_path.exists(), "original must remain untouched");
    assert_eq!(
        std::fs::read_to_string(&backup_path).unwrap(),
        std::fs::read_to_string(&sub_path).unwrap()
    );
    assert!(
        backup_path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .contains("2026-07-31")
    );
}
