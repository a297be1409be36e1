#![forbid(unsafe_code)]

//! Dashboard configuration values.
//!
//! These types are the merge point between whatever loads the configuration
//! (file, test fixture, generated defaults) and the widgets. Every type
//! derives `Deserialize`, so a loader only needs to hand over a
//! `serde_json::Value` or any other serde data format.
//!
//! Module values win over global values; both fall back to the defaults
//! documented on [`CommonSettings`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::geometry::{GridSpec, ModulePlacement};
use crate::settings_doc::{ConfigEntry, ConfigField, DescribeSettings};

/// Refresh interval used when neither the module nor the global config sets one.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 300;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while assembling configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The grid has no columns or no rows.
    EmptyGrid {
        /// Number of columns declared.
        columns: usize,
        /// Number of rows declared.
        rows: usize,
    },
    /// No module kind was registered under this name.
    UnknownModule(String),
    /// A configuration value could not be deserialized.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => write!(
                f,
                "grid needs at least one column and one row (got {columns} columns, {rows} rows)"
            ),
            Self::UnknownModule(kind) => write!(f, "unknown module type: {kind}"),
            Self::Invalid(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Invalid(e.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw configuration shapes
// ─────────────────────────────────────────────────────────────────────────────

/// Color names used for borders and titles.
///
/// Names are interpreted by the terminal drawer; unknown names fall back to
/// the terminal default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeColors {
    /// Border color of a widget that can take focus.
    pub border_focusable: String,
    /// Border color of a widget that currently has focus.
    pub border_focused: String,
    /// Border color of every other widget.
    pub border_normal: String,
    /// Title color.
    pub title: String,
    /// Background of the selected row in list widgets.
    pub highlighted_background: String,
    /// Foreground of even rows in list widgets.
    pub even_row: String,
    /// Foreground of odd rows in list widgets.
    pub odd_row: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            border_focusable: "red".to_string(),
            border_focused: "orange".to_string(),
            border_normal: "grey".to_string(),
            title: "white".to_string(),
            highlighted_background: "blue".to_string(),
            even_row: "white".to_string(),
            odd_row: "lightblue".to_string(),
        }
    }
}

/// Per-module configuration block as declared by the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    /// Module kind; defaults to the block's name when absent.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub enabled: Option<bool>,
    pub focusable: Option<bool>,
    pub bordered: Option<bool>,
    pub refresh_interval: Option<u64>,
    pub title: Option<String>,
    pub focus_char: Option<String>,
    #[serde(default)]
    pub position: ModulePlacement,
    pub colors: Option<ThemeColors>,
    /// Module-specific keys (`graphStars`, `graphIcon`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ModuleConfig {
    /// Parse a module block from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Integer module-specific setting, or `default` when absent or not an integer.
    pub fn extra_u64(&self, key: &str, default: u64) -> u64 {
        self.extra
            .get(key)
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(default)
    }

    /// String module-specific setting, or `default` when absent or not a string.
    pub fn extra_str(&self, key: &str, default: &str) -> String {
        self.extra
            .get(key)
            .and_then(serde_json::Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    /// String list module-specific setting; non-string entries are skipped.
    pub fn extra_str_list(&self, key: &str) -> Vec<String> {
        self.extra
            .get(key)
            .and_then(serde_json::Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Dashboard-wide configuration shared by every module.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalConfig {
    pub grid: GridSpec,
    pub colors: ThemeColors,
    /// Refresh interval for modules that do not declare their own.
    pub refresh_interval: Option<u64>,
    /// Module blocks keyed by instance name, in name order.
    pub mods: BTreeMap<String, ModuleConfig>,
}

impl GlobalConfig {
    /// Parse the global configuration from a JSON value and validate the grid.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.grid.validate()?;
        Ok(config)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Merged settings
// ─────────────────────────────────────────────────────────────────────────────

/// Settings every widget carries, merged from module and global config.
///
/// Created once when the widget is constructed. `enabled` and `focusable` are
/// only the initial values; the runtime copy lives in the widget lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonSettings {
    /// Instance name of the module block.
    pub name: String,
    /// Module kind used to pick the widget constructor.
    pub kind: String,
    pub title: String,
    pub enabled: bool,
    pub focusable: bool,
    pub bordered: bool,
    pub refresh_interval_secs: u64,
    /// Shortcut key that focuses the widget; empty when unassigned.
    pub focus_char: String,
    pub position: ModulePlacement,
    pub colors: ThemeColors,
}

impl CommonSettings {
    /// Merge a module block over the global configuration.
    ///
    /// Defaults: disabled, bordered, `default_focusable`, `default_title`,
    /// the global refresh interval or [`DEFAULT_REFRESH_INTERVAL_SECS`].
    pub fn from_module(
        name: &str,
        default_title: &str,
        default_focusable: bool,
        module: &ModuleConfig,
        global: &GlobalConfig,
    ) -> Self {
        let refresh_interval_secs = module
            .refresh_interval
            .or(global.refresh_interval)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_SECS);

        let settings = Self {
            name: name.to_string(),
            kind: module.kind.clone().unwrap_or_else(|| name.to_string()),
            title: module
                .title
                .clone()
                .unwrap_or_else(|| default_title.to_string()),
            enabled: module.enabled.unwrap_or(false),
            focusable: module.focusable.unwrap_or(default_focusable),
            bordered: module.bordered.unwrap_or(true),
            refresh_interval_secs,
            focus_char: module.focus_char.clone().unwrap_or_default(),
            position: module.position,
            colors: module.colors.clone().unwrap_or_else(|| global.colors.clone()),
        };

        crate::debug!(
            module = %settings.name,
            kind = %settings.kind,
            enabled = settings.enabled,
            refresh_interval_secs,
            "merged module settings"
        );

        settings
    }

    /// Settings with defaults only, for building widgets outside a config file.
    pub fn named(name: &str, title: &str) -> Self {
        Self::from_module(
            name,
            title,
            false,
            &ModuleConfig::default(),
            &GlobalConfig::default(),
        )
    }
}

/// Documentation of the settings every module shares, for nesting into
/// module-specific tables.
pub const COMMON_FIELDS: &[ConfigEntry] = &[
    ConfigEntry::Field(ConfigField::new(
        "Bordered",
        "Whether the module is drawn with a border.",
        true,
        "true, false",
    )),
    ConfigEntry::Field(ConfigField::new(
        "Enabled",
        "Whether the module runs and its data is shown.",
        true,
        "true, false",
    )),
    ConfigEntry::Field(ConfigField::new(
        "FocusChar",
        "A number key that focuses the module directly.",
        true,
        "",
    )),
    ConfigEntry::Field(ConfigField::new(
        "Focusable",
        "Whether the module can take keyboard focus.",
        true,
        "true, false",
    )),
    ConfigEntry::Field(ConfigField::new(
        "Position",
        "Where the module sits in the grid, as left, top, width and height in cells.",
        false,
        "",
    )),
    ConfigEntry::Field(ConfigField::new(
        "RefreshInterval",
        "How often, in seconds, the module fetches new data.",
        true,
        "A positive integer, 0..n.",
    )),
    ConfigEntry::Field(ConfigField::new(
        "Title",
        "The title shown in the module's border.",
        true,
        "",
    )),
    ConfigEntry::Field(ConfigField::new("Colors", "", true, "")),
];

impl DescribeSettings for CommonSettings {
    fn settings_fields() -> &'static [ConfigEntry] {
        COMMON_FIELDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn module_overrides_global() {
        let global = GlobalConfig {
            refresh_interval: Some(60),
            ..GlobalConfig::default()
        };
        let module = ModuleConfig::from_value(json!({
            "type": "feedreader",
            "enabled": true,
            "refreshInterval": 15,
            "title": "News",
            "position": { "top": 1, "left": 2, "width": 1, "height": 1 }
        }))
        .unwrap();

        let s = CommonSettings::from_module("news", "Feeds", true, &module, &global);
        assert_eq!(s.kind, "feedreader");
        assert_eq!(s.title, "News");
        assert!(s.enabled);
        assert!(s.focusable);
        assert_eq!(s.refresh_interval_secs, 15);
        assert_eq!(s.position, ModulePlacement::new(2, 1, 1, 1));
    }

    #[test]
    fn defaults_when_module_is_empty() {
        let global = GlobalConfig {
            refresh_interval: Some(60),
            ..GlobalConfig::default()
        };
        let s = CommonSettings::from_module("clocks", "Clocks", false, &ModuleConfig::default(), &global);
        assert_eq!(s.kind, "clocks");
        assert_eq!(s.title, "Clocks");
        assert!(!s.enabled);
        assert!(!s.focusable);
        assert!(s.bordered);
        assert_eq!(s.refresh_interval_secs, 60);
        assert!(s.focus_char.is_empty());
    }

    #[test]
    fn refresh_interval_falls_back_to_default() {
        let s = CommonSettings::named("x", "X");
        assert_eq!(s.refresh_interval_secs, DEFAULT_REFRESH_INTERVAL_SECS);
    }

    #[test]
    fn extra_keys_are_collected() {
        let module = ModuleConfig::from_value(json!({
            "graphStars": 30,
            "graphIcon": "*",
            "feeds": ["a", 3, "b"]
        }))
        .unwrap();
        assert_eq!(module.extra_u64("graphStars", 20), 30);
        assert_eq!(module.extra_str("graphIcon", "|"), "*");
        assert_eq!(module.extra_u64("missing", 20), 20);
        assert_eq!(module.extra_str_list("feeds"), vec!["a", "b"]);
    }

    #[test]
    fn global_config_validates_grid() {
        let err = GlobalConfig::from_value(json!({ "grid": { "columns": [], "rows": [5] } }));
        assert_eq!(err, Err(ConfigError::EmptyGrid { columns: 0, rows: 1 }));

        let ok = GlobalConfig::from_value(json!({
            "grid": { "columns": [10, 10], "rows": [5] },
            "mods": { "a": { "enabled": true } }
        }))
        .unwrap();
        assert_eq!(ok.mods.len(), 1);
    }

    #[test]
    fn wrong_type_is_invalid() {
        let err = ModuleConfig::from_value(json!({ "enabled": "yes" })).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            ConfigError::UnknownModule("nope".into()).to_string(),
            "unknown module type: nope"
        );
    }
}
