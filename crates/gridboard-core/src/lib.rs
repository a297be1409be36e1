#![forbid(unsafe_code)]

//! Core: grid geometry, input events, configuration, and settings documentation.

pub mod config;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod markup;
pub mod settings_doc;

pub use config::{COMMON_FIELDS, CommonSettings, ConfigError, GlobalConfig, ModuleConfig, ThemeColors};
pub use geometry::{GridSpec, ModulePlacement, resolve};
pub use settings_doc::{ConfigEntry, ConfigField, DescribeSettings, generate};

#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};
