//! Spreadsheet engine API.
//!
//! This module provides the leaf components the sheet is built on:
//!
//! - [`Position`], [`Size`] - Cell addressing (A1 notation ↔ row/col indices)
//! - [`Value`], [`FormulaError`] - Values surfaced to callers
//! - [`Formula`], [`CellLookup`] - Parse, print and evaluate formulas
//! - [`detect_cycle`] - Circular dependency detection

mod cycle;
mod formula;
mod position;
mod value;

pub use cycle::detect_cycle;
pub use formula::{CellLookup, Formula, ParseError, parse_formula};
pub use position::{MAX_COLS, MAX_ROWS, Position, Size};
pub use value::{FormulaError, FormulaErrorKind, Value, format_number};
