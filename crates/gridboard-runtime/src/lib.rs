#![forbid(unsafe_code)]

//! Runtime for gridboard dashboards.
//!
//! - [`refresh`] runs one refresh task per widget.
//! - [`registry`] maps module kinds to widget constructors.
//! - [`dashboard`] places widgets on the grid and routes input.
//! - [`terminal`] owns the terminal and draws panels.
//! - [`telemetry`] sets up file logging.
//!
//! # Example
//!
//! ```no_run
//! use gridboard_runtime::{Dashboard, LogConfig, TerminalSession, WidgetRegistry, init_tracing};
//! use gridboard_core::GlobalConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! init_tracing(&LogConfig::from_env())?;
//! let config = GlobalConfig::from_value(serde_json::json!({
//!     "grid": { "columns": [40, 40], "rows": [10, 10] }
//! }))?;
//! let registry = WidgetRegistry::new();
//! let mut dashboard = Dashboard::from_config(&config, &registry)?;
//! let session = TerminalSession::new()?;
//! dashboard.run(&session)?;
//! # Ok(())
//! # }
//! ```

pub mod dashboard;
pub mod refresh;
pub mod registry;
pub mod telemetry;
pub mod terminal;

pub use dashboard::{Dashboard, DashboardError, adjust_scroll};
pub use refresh::{RefreshMsg, RefreshScheduler, SharedWidget, share};
pub use registry::{WidgetConstructor, WidgetRegistry, help_for};
pub use telemetry::{LogConfig, LogInputs, TelemetryError, init_tracing};
pub use terminal::TerminalSession;
