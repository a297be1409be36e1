#![forbid(unsafe_code)]

//! Human-readable documentation for module settings.
//!
//! Each settings shape declares a static table of [`ConfigEntry`] values once,
//! next to the shape itself. [`generate`] walks the table in declaration order
//! and renders one block per documented field:
//!
//! ```text
//!
//!
//!  refreshInterval
//!  Optional How often, in seconds, the module fetches new data.
//!  Values: A positive integer, 0..n.
//! ```
//!
//! Fields with empty help text are skipped. A [`ConfigEntry::Nested`] entry
//! splices in the output of another table, which is how a module's settings
//! pull in the common settings every widget shares.
//!
//! # Example
//!
//! ```
//! use gridboard_core::settings_doc::{ConfigEntry, ConfigField, generate};
//!
//! const FIELDS: &[ConfigEntry] = &[
//!     ConfigEntry::Field(ConfigField::new("ApiKey", "Your API token.", false, "")),
//!     ConfigEntry::Field(ConfigField::new("Internal", "", false, "")),
//! ];
//!
//! assert_eq!(generate(FIELDS), "\n\n apiKey\n Your API token.");
//! ```

/// Documentation attached to a single settings field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigField {
    /// Field name as declared; rendered with a lowercase first letter.
    pub name: &'static str,
    /// Help text; an empty string hides the field.
    pub help: &'static str,
    /// Whether the field may be omitted.
    pub optional: bool,
    /// Hint describing the accepted values; may be empty.
    pub values: &'static str,
}

impl ConfigField {
    /// Create a field descriptor.
    pub const fn new(
        name: &'static str,
        help: &'static str,
        optional: bool,
        values: &'static str,
    ) -> Self {
        Self {
            name,
            help,
            optional,
            values,
        }
    }

    /// Create a field descriptor from a textual `optional` annotation.
    ///
    /// Anything [`parse_optional_flag`] does not recognise counts as `false`.
    pub fn annotated(
        name: &'static str,
        help: &'static str,
        optional: &str,
        values: &'static str,
    ) -> Self {
        Self::new(name, help, parse_optional_flag(optional), values)
    }

    fn render_into(&self, out: &mut String) {
        if self.help.is_empty() {
            return;
        }
        out.push_str("\n\n ");
        out.push_str(&lowercase_initial(self.name));
        out.push_str("\n ");
        if self.optional {
            out.push_str("Optional ");
        }
        out.push_str(self.help);
        if !self.values.is_empty() {
            out.push_str("\n Values: ");
            out.push_str(self.values);
        }
    }
}

/// One row of a settings documentation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEntry {
    /// A plain documented field.
    Field(ConfigField),
    /// A nested settings shape whose table is rendered in place.
    Nested(&'static [ConfigEntry]),
}

/// A settings shape that can describe its own fields.
pub trait DescribeSettings {
    /// The documentation table, in declaration order.
    fn settings_fields() -> &'static [ConfigEntry];

    /// Rendered documentation for this shape.
    fn config_text() -> String {
        generate(Self::settings_fields())
    }
}

/// Render the documentation for a settings table.
pub fn generate(table: &[ConfigEntry]) -> String {
    let mut out = String::new();
    generate_into(table, &mut out);
    out
}

fn generate_into(table: &[ConfigEntry], out: &mut String) {
    for entry in table {
        match entry {
            ConfigEntry::Field(field) => field.render_into(out),
            ConfigEntry::Nested(inner) => generate_into(inner, out),
        }
    }
}

/// Interpret a textual boolean the way config annotations are written.
///
/// Accepts `1`, `t`, `T`, `true`, `TRUE`, `True` and their false
/// counterparts; everything else is `false`.
pub fn parse_optional_flag(raw: &str) -> bool {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => true,
        "0" | "f" | "F" | "false" | "FALSE" | "False" => false,
        _ => {
            crate::trace!(raw = raw, "unrecognised optional flag, using false");
            false
        }
    }
}

fn lowercase_initial(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
