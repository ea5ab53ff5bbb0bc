//! Values surfaced to callers and the evaluation error type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a formula evaluation failure.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum FormulaErrorKind {
    /// Reference to a position outside the sheet.
    Ref,
    /// Operand that cannot be read as a number.
    Value,
    /// Non-finite arithmetic result, e.g. division by zero.
    Arithmetic,
}

/// An evaluation error. These are values, not failures: they are cached
/// and returned like numbers, and referencing formulas propagate them.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct FormulaError {
    kind: FormulaErrorKind,
}

impl FormulaError {
    pub const fn new(kind: FormulaErrorKind) -> FormulaError {
        FormulaError { kind }
    }

    pub fn kind(&self) -> FormulaErrorKind {
        self.kind
    }

    /// Marker text for this error's kind.
    pub fn as_str(&self) -> &'static str {
        match self.kind {
            FormulaErrorKind::Ref => "#REF!",
            FormulaErrorKind::Value => "#VALUE!",
            FormulaErrorKind::Arithmetic => "#ARITHM!",
        }
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value of a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Empty,
    Text(String),
    Number(f64),
    Error(FormulaError),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<FormulaError> {
        match self {
            Value::Error(e) => Some(*e),
            _ => None,
        }
    }
}

impl From<Result<f64, FormulaError>> for Value {
    fn from(result: Result<f64, FormulaError>) -> Self {
        match result {
            Ok(n) => Value::Number(n),
            Err(e) => Value::Error(e),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Error(e) => write!(f, "{}", e),
        }
    }
}

/// Format a number for display.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Avoid printing "-0".
        "0".to_string()
    } else {
        n.to_string()
    }
}
