//! Configuration schema types for `stitch.toml`
//!
//! Defines the structure and validation rules for stitchbook configuration.

use serde::{Deserialize, Serialize};

use crate::palettes;
use crate::stitch::WeightTable;

/// Palette loading section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PalettesConfig {
    /// Built-in catalogs to load at startup (default: all)
    #[serde(default = "default_builtin")]
    pub builtin: Vec<String>,
    /// Catalog used to resolve bare color ids
    #[serde(default = "default_category")]
    pub default: String,
}

fn default_builtin() -> Vec<String> {
    palettes::list_builtins().into_iter().map(String::from).collect()
}

fn default_category() -> String {
    "dmc".to_string()
}

impl Default for PalettesConfig {
    fn default() -> Self {
        Self { builtin: default_builtin(), default: default_category() }
    }
}

/// Document-local swatch section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Display name of the local swatch palette
    #[serde(default = "default_local_name")]
    pub name: String,
}

fn default_local_name() -> String {
    "Local Swatches".to_string()
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self { name: default_local_name() }
    }
}

/// Complete stitch.toml configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StitchConfig {
    /// Thread weight per stitch kind
    #[serde(default)]
    pub weights: WeightTable,
    /// Palette loading
    #[serde(default)]
    pub palettes: PalettesConfig,
    /// Local swatches
    #[serde(default)]
    pub local: LocalConfig,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "palettes.default")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stitch.toml: '{}' {}", self.field, self.message)
    }
}

impl StitchConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.weights.full == 0 {
            errors.push(ConfigValidationError {
                field: "weights.full".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        for (i, id) in self.palettes.builtin.iter().enumerate() {
            if palettes::get_builtin(id).is_none() {
                errors.push(ConfigValidationError {
                    field: format!("palettes.builtin[{}]", i),
                    message: format!(
                        "unknown palette '{}', expected one of: {}",
                        id,
                        palettes::list_builtins().join(", ")
                    ),
                });
            }
        }

        if self.palettes.default.is_empty() {
            errors.push(ConfigValidationError {
                field: "palettes.default".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        errors
    }
}
