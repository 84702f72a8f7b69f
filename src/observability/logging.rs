//! Structured logging configuration.

use crate::config::LoggingSettings;
use crate::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, level-tagged text lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Returns the format name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(Error::InvalidInput(format!(
                "unknown log format {other:?} (expected pretty or json)"
            ))),
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// File the log lines are appended to.
    pub file: PathBuf,
    /// Output format.
    pub format: LogFormat,
    /// Level filter.
    pub filter: EnvFilter,
}

impl LoggingConfig {
    /// Builds the logging configuration from settings.
    ///
    /// `verbose` forces the `debug` level regardless of the configured filter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the filter directive cannot be parsed.
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Result<Self> {
        let directive = if verbose { "debug" } else { settings.filter.as_str() };
        let filter = EnvFilter::try_new(directive).map_err(|e| {
            Error::InvalidInput(format!("invalid log filter {directive:?}: {e}"))
        })?;

        Ok(Self {
            file: settings.file.clone(),
            format: settings.format,
            filter,
        })
    }
}
