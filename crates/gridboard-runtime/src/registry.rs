#![forbid(unsafe_code)]

//! Module kind registry.
//!
//! Maps a module kind (the `type` key of a module block, or its name) to a
//! constructor. Kinds nobody registered still produce a widget: an
//! [`UnknownWidget`] that says so in place of content.

use std::collections::BTreeMap;
use std::fmt;

use gridboard_core::markup::strip_color_tags;
use gridboard_core::{CommonSettings, ConfigError, GlobalConfig, ModuleConfig};
use gridboard_widgets::{UnknownWidget, Widget};

/// Builds a widget for one module block.
pub type WidgetConstructor =
    Box<dyn Fn(&str, &ModuleConfig, &GlobalConfig) -> Box<dyn Widget> + Send + Sync>;

/// Registered module kinds.
#[derive(Default)]
pub struct WidgetRegistry {
    constructors: BTreeMap<String, WidgetConstructor>,
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("kinds", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `constructor` for `kind`, replacing any earlier one.
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F)
    where
        F: Fn(&str, &ModuleConfig, &GlobalConfig) -> Box<dyn Widget> + Send + Sync + 'static,
    {
        let kind = kind.into();
        tracing::trace!(kind = %kind, "module kind registered");
        self.constructors.insert(kind, Box::new(constructor));
    }

    /// Builder form of [`Self::register`].
    #[must_use]
    pub fn with<F>(mut self, kind: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&str, &ModuleConfig, &GlobalConfig) -> Box<dyn Widget> + Send + Sync + 'static,
    {
        self.register(kind, constructor);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered kinds in name order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Build the widget for module block `name`, failing for kinds nobody
    /// registered.
    pub fn try_build(
        &self,
        name: &str,
        module: &ModuleConfig,
        global: &GlobalConfig,
    ) -> Result<Box<dyn Widget>, ConfigError> {
        let kind = module.kind.as_deref().unwrap_or(name);
        self.constructors
            .get(kind)
            .map(|constructor| constructor(name, module, global))
            .ok_or_else(|| ConfigError::UnknownModule(kind.to_string()))
    }

    /// Build the widget for module block `name`. Unknown kinds get an
    /// [`UnknownWidget`].
    pub fn build(&self, name: &str, module: &ModuleConfig, global: &GlobalConfig) -> Box<dyn Widget> {
        self.try_build(name, module, global).unwrap_or_else(|err| {
            tracing::warn!(module = name, error = %err, "falling back to placeholder widget");
            let mut settings =
                CommonSettings::from_module(name, UnknownWidget::TITLE, false, module, global);
            settings.kind = module.kind.as_deref().unwrap_or(name).to_string();
            Box::new(UnknownWidget::new(settings))
        })
    }

    /// Build every enabled module of `global`, in module name order.
    pub fn build_enabled(&self, global: &GlobalConfig) -> Vec<Box<dyn Widget>> {
        global
            .mods
            .iter()
            .filter(|(_, module)| module.enabled.unwrap_or(false))
            .map(|(name, module)| self.build(name, module, global))
            .collect()
    }

    /// Usage and configuration help for a module kind.
    ///
    /// The widget is built from an empty config block just to ask it for
    /// its help text.
    pub fn help_for(&self, kind: &str) -> String {
        let module = ModuleConfig {
            kind: Some(kind.to_string()),
            ..ModuleConfig::default()
        };
        let Ok(widget) = self.try_build(kind, &module, &GlobalConfig::default()) else {
            return format!("Unable to find module {kind}");
        };
        format!(
            "{}\nConfiguration Attributes{}",
            strip_color_tags(&widget.help_text()),
            widget.config_text()
        )
    }
}

/// Free-function form of [`WidgetRegistry::help_for`].
pub fn help_for(kind: &str, registry: &WidgetRegistry) -> String {
    registry.help_for(kind)
}
