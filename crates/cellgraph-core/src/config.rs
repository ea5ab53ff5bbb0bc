//! Sheet configuration.
//!
//! Configuration is plain TOML:
//!
//! ```toml
//! error_style = "distinct"
//! ```

use serde::{Deserialize, Serialize};

use cellgraph_engine::engine::FormulaError;

use crate::error::Result;

/// Marker used for every evaluation error under [`ErrorStyle::Uniform`].
pub const UNIFORM_ERROR_MARKER: &str = "#ARITHM!";

/// How evaluation errors are rendered in the value dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorStyle {
    /// Every error kind renders as `#ARITHM!`.
    #[default]
    Uniform,
    /// Each error kind renders with its own marker (`#REF!`, `#VALUE!`, `#ARITHM!`).
    Distinct,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SheetConfig {
    pub error_style: ErrorStyle,
}

impl SheetConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn render_error(&self, error: &FormulaError) -> &'static str {
        match self.error_style {
            ErrorStyle::Uniform => UNIFORM_ERROR_MARKER,
            ErrorStyle::Distinct => error.as_str(),
        }
    }
}
