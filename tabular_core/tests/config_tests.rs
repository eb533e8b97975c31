//! Integration tests for layered trainer configuration

use serial_test::serial;
use std::fs;
use tabular_core::config::{ConfigLoader, Devices, TrainerConfig};
use tempfile::TempDir;

// Test helper: loader reading from an isolated directory
fn loader_with_file(temp_dir: &TempDir, contents: Option<&str>) -> ConfigLoader {
    let config_path = temp_dir.path().join("config.toml");
    if let Some(contents) = contents {
        fs::write(&config_path, contents).unwrap();
    }
    ConfigLoader::with_path(config_path)
}

fn set_env(key: &str, value: &str) {
    // SAFETY: env-mutating tests are serialized with `#[serial]`
    unsafe { std::env::set_var(key, value) }
}

fn remove_env(key: &str) {
    // SAFETY: env-mutating tests are serialized with `#[serial]`
    unsafe { std::env::remove_var(key) }
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = loader_with_file(&temp_dir, None).load().unwrap();

    assert_eq!(config, TrainerConfig::default());
}

#[test]
#[serial]
fn test_file_values_override_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let loader = loader_with_file(
        &temp_dir,
        Some(
            r#"
max_epochs = 25
accelerator = "gpu"
devices = 2
progress_bar = "rich"

[progress_options]
hidden = true
"#,
        ),
    );

    let config = loader.load().unwrap();
    assert_eq!(config.max_epochs, 25);
    assert_eq!(config.accelerator, "gpu");
    assert_eq!(config.devices, Devices::Count(2));
    assert_eq!(config.progress_bar, "rich");
    assert_eq!(
        config.progress_options.get("hidden"),
        Some(&serde_json::Value::Bool(true))
    );
}

#[test]
#[serial]
fn test_file_devices_list_wins_over_devices() {
    let temp_dir = TempDir::new().unwrap();
    let loader = loader_with_file(&temp_dir, Some("devices = 4\ndevices_list = [1, 3]\n"));

    let config = loader.load().unwrap();
    assert_eq!(config.devices, Devices::List(vec![1, 3]));
    assert_eq!(config.devices_list, Some(vec![1, 3]));
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    let loader = loader_with_file(&temp_dir, Some("progress_bar = \"rich\"\nmax_epochs = 3\n"));

    set_env("TABULAR_PROGRESS_BAR", "none");
    set_env("TABULAR_ENABLE_PROGRESS_BAR", "false");
    let config = loader.load();
    remove_env("TABULAR_PROGRESS_BAR");
    remove_env("TABULAR_ENABLE_PROGRESS_BAR");

    let config = config.unwrap();
    assert_eq!(config.progress_bar, "none");
    assert!(!config.enable_progress_bar);
    assert_eq!(config.max_epochs, 3);
}

#[test]
#[serial]
fn test_nested_environment_keys() {
    let temp_dir = TempDir::new().unwrap();
    let loader = loader_with_file(&temp_dir, None);

    set_env("TABULAR_PROGRESS_OPTIONS__EVERY", "5");
    let config = loader.load();
    remove_env("TABULAR_PROGRESS_OPTIONS__EVERY");

    let config = config.unwrap();
    assert_eq!(
        config.progress_options.get("every"),
        Some(&serde_json::json!(5))
    );
}

#[test]
#[serial]
fn test_invalid_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let loader = loader_with_file(&temp_dir, Some("max_epochs = \"lots\"\n"));

    let error = loader.load().unwrap_err();
    assert!(error.to_string().starts_with("Failed to load configuration"));
}

#[test]
#[serial]
fn test_progress_settings_from_loaded_config() {
    let temp_dir = TempDir::new().unwrap();
    let loader = loader_with_file(
        &temp_dir,
        Some("progress_bar = \"tqdm\"\nenable_progress_bar = false\n"),
    );

    let settings = loader.load().unwrap().progress_settings();
    assert_eq!(settings.backend.as_deref(), Some("tqdm"));
    assert!(!settings.enabled);
}
