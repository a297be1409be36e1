#![forbid(unsafe_code)]

//! Gridboard public facade crate.
//!
//! Re-exports the types a dashboard binary needs from the internal crates and
//! offers a prelude. With the `runtime` feature (on by default), [`run`]
//! wires logging, the terminal and the dashboard together.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use gridboard_core::event::{Event, KeyCode, KeyEvent, Modifiers};
pub use gridboard_core::geometry::{ModulePlacement, Rect, Size};
pub use gridboard_core::settings_doc::{ConfigEntry, ConfigField, DescribeSettings, generate};
pub use gridboard_core::{
    COMMON_FIELDS, CommonSettings, ConfigError, GlobalConfig, GridSpec, ModuleConfig, ThemeColors,
};

// --- Widget re-exports -----------------------------------------------------

pub use gridboard_widgets::{
    Bar, BarGraph, BarSource, Content, FetchError, InputOutcome, ItemSource, KeyboardDispatch,
    ListWidget, Scroll, SelectionModel, UnknownWidget, Widget, WidgetLifecycle,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use gridboard_runtime::{
    Dashboard, DashboardError, LogConfig, TelemetryError, TerminalSession, WidgetRegistry,
    help_for, init_tracing,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for gridboard binaries.
#[derive(Debug)]
pub enum Error {
    /// I/O failure during terminal operations.
    Io(std::io::Error),
    /// The configuration is unusable.
    Config(ConfigError),
    /// Logging could not be set up.
    #[cfg(feature = "runtime")]
    Telemetry(TelemetryError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            #[cfg(feature = "runtime")]
            Self::Telemetry(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Config(err) => Some(err),
            #[cfg(feature = "runtime")]
            Self::Telemetry(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(feature = "runtime")]
impl From<TelemetryError> for Error {
    fn from(err: TelemetryError) -> Self {
        Self::Telemetry(err)
    }
}

#[cfg(feature = "runtime")]
impl From<DashboardError> for Error {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::Io(e) => Self::Io(e),
            DashboardError::Config(e) => Self::Config(e),
        }
    }
}

/// Standard result type for gridboard APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Run a dashboard for `config` until the user quits.
///
/// Logging is configured from the environment (see
/// [`gridboard_runtime::telemetry`]). The terminal is restored on every exit
/// path.
#[cfg(feature = "runtime")]
pub fn run(config: &GlobalConfig, registry: &WidgetRegistry) -> Result<()> {
    init_tracing(&LogConfig::from_env())?;
    let mut dashboard = Dashboard::from_config(config, registry)?;
    let session = TerminalSession::new()?;
    dashboard.run(&session)?;
    Ok(())
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Bar, BarSource, CommonSettings, Content, Error, Event, FetchError, GlobalConfig,
        InputOutcome, ItemSource, KeyCode, KeyEvent, ModuleConfig, Result, Size, Widget,
        WidgetLifecycle,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{Dashboard, WidgetRegistry};

    pub use crate::{core, widgets};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use gridboard_core as core;
#[cfg(feature = "runtime")]
pub use gridboard_runtime as runtime;
pub use gridboard_widgets as widgets;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert() {
        let err: Error = ConfigError::UnknownModule("x".into()).into();
        assert_eq!(err.to_string(), "unknown module type: x");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[cfg(feature = "runtime")]
    #[test]
    fn dashboard_errors_flatten() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: Error = DashboardError::Io(io).into();
        assert!(matches!(err, Error::Io(_)));
    }
}
