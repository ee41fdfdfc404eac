//! Run Configuration
//!
//! Resolves command-line flags, an optional TOML file and the inactivity
//! period file into one [`RunConfig`]. Any failure here is fatal before the
//! first log row is read.

use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::edgar::OutputFormat;
use crate::session::{OrderingPolicy, OutputOrder};

/// Name of the inactivity period file looked up next to the input log
pub const INACTIVITY_FILE_NAME: &str = "inactivity_period.txt";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read inactivity period from {}: {source}", path.display())]
    MissingThreshold {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid inactivity period '{0}'")]
    InvalidThreshold(String),

    #[error("Inactivity period must be non-negative, got {0}")]
    NegativeThreshold(i64),

    #[error("Cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for configuration
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings accepted from a TOML config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Inactivity period in seconds
    pub inactivity_period: Option<i64>,
    /// File holding the inactivity period
    pub inactivity_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub ordering: Option<OrderingPolicy>,
    pub output_order: Option<OutputOrder>,
    pub strict: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub inactivity_period: Option<i64>,
    pub inactivity_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub ordering: Option<OrderingPolicy>,
    pub output_order: Option<OutputOrder>,
    pub strict: bool,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub inactivity_threshold: i64,
    pub format: OutputFormat,
    pub ordering: OrderingPolicy,
    pub output_order: OutputOrder,
    pub strict: bool,
}

impl RunConfig {
    /// Merge command-line values over file values over defaults.
    ///
    /// Without an explicit period, it is read from the inactivity file:
    /// the one named by flag or config, else `inactivity_period.txt` beside
    /// the input log.
    pub fn resolve(
        input: PathBuf,
        output: PathBuf,
        overrides: Overrides,
        file: FileConfig,
    ) -> ConfigResult<Self> {
        let inactivity_threshold = match overrides.inactivity_period.or(file.inactivity_period) {
            Some(secs) => secs,
            None => {
                let path = overrides
                    .inactivity_file
                    .or(file.inactivity_file)
                    .unwrap_or_else(|| default_inactivity_file(&input));
                read_inactivity_period(&path)?
            }
        };

        if inactivity_threshold < 0 {
            return Err(ConfigError::NegativeThreshold(inactivity_threshold));
        }

        let config = Self {
            input,
            output,
            inactivity_threshold,
            format: overrides.format.or(file.format).unwrap_or_default(),
            ordering: overrides.ordering.or(file.ordering).unwrap_or_default(),
            output_order: overrides.output_order.or(file.output_order).unwrap_or_default(),
            strict: overrides.strict || file.strict.unwrap_or(false),
        };
        debug!("Resolved config: {:?}", config);
        Ok(config)
    }
}

fn default_inactivity_file(input: &Path) -> PathBuf {
    input
        .parent()
        .map(|dir| dir.join(INACTIVITY_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(INACTIVITY_FILE_NAME))
}

/// Read the inactivity period, in seconds, from a file
pub fn read_inactivity_period(path: &Path) -> ConfigResult<i64> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::MissingThreshold {
        path: path.to_path_buf(),
        source,
    })?;
    parse_inactivity_period(&content)
}

/// Parse an inactivity period such as `2` or `2.5`.
///
/// Timestamps are whole seconds, so a fractional period is floored.
pub fn parse_inactivity_period(raw: &str) -> ConfigResult<i64> {
    let trimmed = raw.trim();
    if let Ok(secs) = trimmed.parse::<i64>() {
        return Ok(secs);
    }

    match trimmed.parse::<f64>() {
        Ok(secs) if !secs.is_finite() => Err(ConfigError::InvalidThreshold(trimmed.to_string())),
        Ok(secs) if secs < 0.0 => Err(ConfigError::NegativeThreshold(secs.floor() as i64)),
        Ok(secs) => Ok(secs.floor() as i64),
        Err(_) => Err(ConfigError::InvalidThreshold(trimmed.to_string())),
    }
}
