//! Configuration loading
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (`ConfigOverrides`)
//! 2. Environment variables (`MMX_*`)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing default TOML file is not an error: the tools warn and continue
//! with defaults. A TOML file named explicitly on the command line must exist
//! and parse.

use crate::pcm::{SampleFormat, DEFAULT_SAMPLE_RATE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Environment variable overriding the output sample rate
pub const ENV_SAMPLE_RATE: &str = "MMX_SAMPLE_RATE";
/// Environment variable overriding the output directory
pub const ENV_OUTPUT_DIR: &str = "MMX_OUTPUT_DIR";
/// Environment variable overriding the channel naming scheme
pub const ENV_CHANNEL_NAMING: &str = "MMX_CHANNEL_NAMING";
/// Environment variable overriding the output sample format
pub const ENV_SAMPLE_FORMAT: &str = "MMX_SAMPLE_FORMAT";
/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "MMX_LOG_LEVEL";

/// How per-channel outputs are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelNaming {
    /// `<base><index>` with index 0..9
    #[default]
    Index,

    /// `<base><strip>` using the mixer strip names (ch1, ch3, ..., mixR)
    Mixer,
}

impl FromStr for ChannelNaming {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "index" => Ok(ChannelNaming::Index),
            "mixer" => Ok(ChannelNaming::Mixer),
            other => Err(Error::Config(format!(
                "Unknown channel naming '{}' (expected index or mixer)",
                other
            ))),
        }
    }
}

impl fmt::Display for ChannelNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelNaming::Index => f.write_str("index"),
            ChannelNaming::Mixer => f.write_str("mixer"),
        }
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Output sample rate in Hz
    ///
    /// Default: 96000 (the only rate the device runs at)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Directory receiving the per-channel files (optional)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Channel file naming scheme
    #[serde(default)]
    pub channel_naming: ChannelNaming,

    /// Output sample encoding
    #[serde(default)]
    pub sample_format: SampleFormat,

    /// Print the running frame counter after every transfer line
    #[serde(default = "default_progress")]
    pub progress: bool,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            output_dir: None,
            channel_naming: ChannelNaming::default(),
            sample_format: SampleFormat::default(),
            progress: default_progress(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Read and parse a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&toml_str)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_progress() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub sample_rate: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub channel_naming: Option<ChannelNaming>,
    pub sample_format: Option<SampleFormat>,
    pub progress: Option<bool>,
    pub log_level: Option<String>,
}

/// Resolved extraction configuration
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// Directory receiving the per-channel files
    pub output_dir: PathBuf,

    /// Channel file naming scheme
    pub channel_naming: ChannelNaming,

    /// Output sample encoding
    pub sample_format: SampleFormat,

    /// Print the running frame counter per transfer line
    pub progress: bool,

    /// Logging settings
    pub logging: LoggingConfig,

    /// TOML file the settings were read from, if any
    pub config_file: Option<PathBuf>,
}

impl ExtractConfig {
    /// Load configuration from all sources
    ///
    /// # Arguments
    ///
    /// - `config_path`: TOML file named on the command line (must exist)
    /// - `overrides`: command-line overrides
    ///
    /// Without `config_path` the platform config file is used when present.
    pub fn load(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let (toml_config, config_file) = match config_path {
            Some(path) => {
                let config = TomlConfig::from_file(path)?;
                info!("Loaded TOML configuration from {}", path.display());
                (config, Some(path.to_path_buf()))
            }
            None => match default_config_file() {
                Some(path) => match TomlConfig::from_file(&path) {
                    Ok(config) => {
                        info!("Loaded TOML configuration from {}", path.display());
                        (config, Some(path))
                    }
                    Err(e) => {
                        warn!("Ignoring unreadable config file {}: {}", path.display(), e);
                        (TomlConfig::default(), None)
                    }
                },
                None => {
                    debug!("No config file found, using defaults");
                    (TomlConfig::default(), None)
                }
            },
        };

        let mut config = Self::resolve(toml_config, overrides, |key| std::env::var(key).ok())?;
        config.config_file = config_file;
        Ok(config)
    }

    /// Merge TOML settings, environment and overrides
    ///
    /// `env` looks up an environment variable by name.
    pub fn resolve<F>(toml_config: TomlConfig, overrides: ConfigOverrides, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sample_rate = match overrides.sample_rate {
            Some(rate) => rate,
            None => match env(ENV_SAMPLE_RATE) {
                Some(value) => value.trim().parse::<u32>().map_err(|e| {
                    Error::Config(format!("Invalid {} '{}': {}", ENV_SAMPLE_RATE, value, e))
                })?,
                None => toml_config.sample_rate,
            },
        };
        if sample_rate == 0 {
            return Err(Error::Config("Sample rate must be greater than zero".to_string()));
        }

        let output_dir = overrides
            .output_dir
            .or_else(|| env(ENV_OUTPUT_DIR).map(PathBuf::from))
            .or(toml_config.output_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let channel_naming = match overrides.channel_naming {
            Some(naming) => naming,
            None => match env(ENV_CHANNEL_NAMING) {
                Some(value) => value.parse()?,
                None => toml_config.channel_naming,
            },
        };

        let sample_format = match overrides.sample_format {
            Some(format) => format,
            None => match env(ENV_SAMPLE_FORMAT) {
                Some(value) => value.parse()?,
                None => toml_config.sample_format,
            },
        };

        let mut logging = toml_config.logging;
        if let Some(level) = overrides.log_level.or_else(|| env(ENV_LOG_LEVEL)) {
            logging.level = level;
        }

        Ok(Self {
            sample_rate,
            output_dir,
            channel_naming,
            sample_format,
            progress: overrides.progress.unwrap_or(toml_config.progress),
            logging,
            config_file: None,
        })
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        let toml_config = TomlConfig::default();
        Self {
            sample_rate: toml_config.sample_rate,
            output_dir: PathBuf::from("."),
            channel_naming: toml_config.channel_naming,
            sample_format: toml_config.sample_format,
            progress: toml_config.progress,
            logging: toml_config.logging,
            config_file: None,
        }
    }
}

/// Platform configuration file, if one exists
///
/// Linux checks `~/.config/mmx/config.toml` then `/etc/mmx/config.toml`;
/// other platforms only the user config directory.
pub fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("mmx").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/mmx/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
