//! Configuration loading tests
//!
//! Covers TOML files named on the command line and the environment layer.
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate MMX_* variables are marked with #[serial].

use mmx_common::config::{
    ChannelNaming, ConfigOverrides, ExtractConfig, ENV_CHANNEL_NAMING, ENV_LOG_LEVEL,
    ENV_OUTPUT_DIR, ENV_SAMPLE_FORMAT, ENV_SAMPLE_RATE,
};
use mmx_common::{Error, SampleFormat};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_env() {
    for key in [
        ENV_SAMPLE_RATE,
        ENV_OUTPUT_DIR,
        ENV_CHANNEL_NAMING,
        ENV_SAMPLE_FORMAT,
        ENV_LOG_LEVEL,
    ] {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_explicit_config_file_is_loaded() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mmx.toml");
    fs::write(
        &config_path,
        "sample_rate = 48000\nchannel_naming = \"mixer\"\noutput_dir = \"captures\"\n",
    )
    .unwrap();

    let config = ExtractConfig::load(Some(&config_path), ConfigOverrides::default()).unwrap();

    assert_eq!(config.sample_rate, 48_000);
    assert_eq!(config.channel_naming, ChannelNaming::Mixer);
    assert_eq!(config.output_dir, PathBuf::from("captures"));
    assert_eq!(config.config_file, Some(config_path));
}

#[test]
#[serial]
fn test_missing_explicit_config_file_is_error() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("does-not-exist.toml");

    let result = ExtractConfig::load(Some(&config_path), ConfigOverrides::default());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_malformed_config_file_is_error() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "sample_rate = \"fast\"").unwrap();

    let result = ExtractConfig::load(Some(&config_path), ConfigOverrides::default());
    assert!(matches!(result, Err(Error::Toml(_))));
}

#[test]
#[serial]
fn test_env_overrides_config_file() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mmx.toml");
    fs::write(&config_path, "sample_rate = 48000\nsample_format = \"pcm24\"\n").unwrap();

    env::set_var(ENV_SAMPLE_RATE, "44100");
    env::set_var(ENV_SAMPLE_FORMAT, "float32");
    let config = ExtractConfig::load(Some(&config_path), ConfigOverrides::default());
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.sample_rate, 44_100);
    assert_eq!(config.sample_format, SampleFormat::Float32);
}

#[test]
#[serial]
fn test_cli_overrides_env() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mmx.toml");
    fs::write(&config_path, "").unwrap();

    env::set_var(ENV_OUTPUT_DIR, "/from/env");
    env::set_var(ENV_LOG_LEVEL, "warn");
    let overrides = ConfigOverrides {
        output_dir: Some(PathBuf::from("/from/cli")),
        progress: Some(false),
        ..ConfigOverrides::default()
    };
    let config = ExtractConfig::load(Some(&config_path), overrides);
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.output_dir, PathBuf::from("/from/cli"));
    assert_eq!(config.logging.level, "warn");
    assert!(!config.progress);
}

#[test]
#[serial]
fn test_invalid_env_naming_is_error() {
    clear_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("mmx.toml");
    fs::write(&config_path, "").unwrap();

    env::set_var(ENV_CHANNEL_NAMING, "alphabetical");
    let result = ExtractConfig::load(Some(&config_path), ConfigOverrides::default());
    clear_env();

    assert!(matches!(result, Err(Error::Config(_))));
}
