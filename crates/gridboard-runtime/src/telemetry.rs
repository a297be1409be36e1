#![forbid(unsafe_code)]

//! Log output setup.
//!
//! The dashboard owns the terminal, so log lines can never go to stdout or
//! stderr. [`init_tracing`] installs a `tracing-subscriber` fmt subscriber
//! that writes to a log file, or installs nothing when no file is configured.
//!
//! # Env var contract
//!
//! - `GRIDBOARD_LOG` - `EnvFilter` directives, e.g. `gridboard_runtime=debug`.
//!   Defaults to [`LogConfig::DEFAULT_FILTER`].
//! - `GRIDBOARD_LOG_FILE` - path of the log file. Logging is off when unset.
//!
//! Environment reads go through [`LogInputs`] so tests never touch the
//! process environment.

use std::env;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Env var holding the filter directives.
pub const LOG_FILTER_ENV: &str = "GRIDBOARD_LOG";
/// Env var holding the log file path.
pub const LOG_FILE_ENV: &str = "GRIDBOARD_LOG_FILE";

/// Raw values that [`LogConfig`] is derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogInputs {
    pub filter: Option<String>,
    pub file: Option<String>,
}

impl LogInputs {
    /// Read the inputs from the process environment.
    pub fn from_env() -> Self {
        Self {
            filter: env::var(LOG_FILTER_ENV).ok(),
            file: env::var(LOG_FILE_ENV).ok(),
        }
    }
}

/// Where the filter directives came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    Env,
    Default,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub filter: String,
    pub filter_source: FilterSource,
    /// Log file; `None` disables logging.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: Self::DEFAULT_FILTER.to_string(),
            filter_source: FilterSource::Default,
            file: None,
        }
    }
}

impl LogConfig {
    pub const DEFAULT_FILTER: &'static str = "info";

    pub fn from_env() -> Self {
        Self::from_inputs(LogInputs::from_env())
    }

    /// Derive a config from explicit inputs. Blank values count as unset.
    pub fn from_inputs(inputs: LogInputs) -> Self {
        let filter = inputs
            .filter
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());
        let file = inputs
            .file
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .map(PathBuf::from);

        match filter {
            Some(filter) => Self {
                filter,
                filter_source: FilterSource::Env,
                file,
            },
            None => Self {
                file,
                ..Self::default()
            },
        }
    }

    /// Write logs to `path`.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Parse the filter directives.
    pub fn env_filter(&self) -> Result<EnvFilter, TelemetryError> {
        EnvFilter::try_new(&self.filter).map_err(|e| TelemetryError::InvalidFilter {
            filter: self.filter.clone(),
            reason: e.to_string(),
        })
    }
}

/// Errors that can occur while installing the log subscriber.
#[derive(Debug)]
pub enum TelemetryError {
    /// A global tracing subscriber is already installed.
    AlreadyInstalled,
    /// The filter directives do not parse.
    InvalidFilter { filter: String, reason: String },
    /// The log file could not be opened.
    LogFile { path: PathBuf, source: io::Error },
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInstalled => write!(f, "a global tracing subscriber is already set"),
            Self::InvalidFilter { filter, reason } => {
                write!(f, "invalid log filter {filter:?}: {reason}")
            }
            Self::LogFile { path, source } => {
                write!(f, "cannot open log file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::LogFile { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn open_log_file(path: &Path) -> Result<File, TelemetryError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| TelemetryError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Install the global log subscriber described by `config`.
///
/// Returns `Ok(false)` without installing anything when no log file is
/// configured.
pub fn init_tracing(config: &LogConfig) -> Result<bool, TelemetryError> {
    let Some(path) = &config.file else {
        return Ok(false);
    };
    let filter = config.env_filter()?;
    let file = open_log_file(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_thread_names(true)
        .try_init()
        .map_err(|_| TelemetryError::AlreadyInstalled)?;

    tracing::info!(
        filter = %config.filter,
        source = ?config.filter_source,
        file = %path.display(),
        "logging installed"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(filter: Option<&str>, file: Option<&str>) -> LogInputs {
        LogInputs {
            filter: filter.map(str::to_string),
            file: file.map(str::to_string),
        }
    }

    #[test]
    fn defaults_without_env() {
        let config = LogConfig::from_inputs(LogInputs::default());
        assert_eq!(config, LogConfig::default());
        assert_eq!(config.filter, "info");
        assert!(!config.is_enabled());
    }

    #[test]
    fn env_filter_wins() {
        let config = LogConfig::from_inputs(inputs(Some("gridboard_runtime=debug"), Some("/tmp/g.log")));
        assert_eq!(config.filter, "gridboard_runtime=debug");
        assert_eq!(config.filter_source, FilterSource::Env);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/g.log")));
    }

    #[test]
    fn blank_values_are_unset() {
        let config = LogConfig::from_inputs(inputs(Some("  "), Some("")));
        assert_eq!(config.filter_source, FilterSource::Default);
        assert_eq!(config.file, None);
    }

    #[test]
    fn invalid_filter_is_reported() {
        let config = LogConfig::from_inputs(inputs(Some("gridboard=loud"), None));
        let err = config.env_filter().unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidFilter { .. }));
        assert!(err.to_string().starts_with("invalid log filter"));
    }

    #[test]
    fn no_file_installs_nothing() {
        assert!(!init_tracing(&LogConfig::default()).unwrap());
    }

    #[test]
    fn unopenable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig::default().with_file(dir.path().join("missing").join("g.log"));
        let err = init_tracing(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::LogFile { .. }));
        assert!(std::error::Error::source(&err).is_some());
    }
}
