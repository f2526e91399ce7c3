use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Language tag of the upper track (ISO 639-1 or 639-2, may be empty)
    #[serde(default)]
    pub upper_language: String,

    /// Language tag of the lower track (ISO 639-1 or 639-2, may be empty)
    #[serde(default)]
    pub lower_language: String,

    /// Strip inline markup tags from the merged output
    #[serde(default)]
    pub plain_text: bool,

    /// Encoding to retry with when an input is not valid UTF-8 SubRip
    #[serde(default)]
    pub encoding_fallback: EncodingFallback,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Second decoding attempt for input files
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EncodingFallback {
    // @fallback: Every byte is one ISO-8859-1 character
    #[default]
    Latin1,
    // @fallback: UTF-8 only
    None,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching filter for the log facade
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        for (side, code) in [("upper", &self.upper_language), ("lower", &self.lower_language)] {
            if code.is_empty() {
                continue;
            }
            crate::language_utils::validate_language_code(code)
                .with_context(|| format!("Invalid {} track language", side))?;
        }

        Ok(())
    }

    /// Language tags of both tracks as they should be attached to parsed tracks
    pub fn language_tags(&self) -> (Vec<String>, Vec<String>) {
        let tag = |code: &str| -> Vec<String> {
            if code.is_empty() {
                return Vec::new();
            }
            let normalized = crate::language_utils::normalize_to_part1_or_part2t(code)
                .unwrap_or_else(|_| code.trim().to_lowercase());
            vec![normalized]
        };
        (tag(&self.upper_language), tag(&self.lower_language))
    }

    /// Load the configuration file, creating it with defaults if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            upper_language: String::new(),
            lower_language: String::new(),
            plain_text: false,
            encoding_fallback: EncodingFallback::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl std::str::FromStr for EncodingFallback {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            "none" => Ok(Self::None),
            _ => Err(anyhow!("Invalid encoding fallback: {}", s)),
        }
    }
}
