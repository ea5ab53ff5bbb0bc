//! Cellgraph - the dependency graph, cycle detection and cache
//! invalidation core of a spreadsheet.
//!
//! ```
//! use cellgraph::{Position, Sheet, Value};
//!
//! let mut sheet = Sheet::new();
//! sheet.set_cell(Position::from_label("A1"), "5").unwrap();
//! sheet.set_cell(Position::from_label("B1"), "=A1+1").unwrap();
//! assert_eq!(sheet.value(Position::from_label("B1")).unwrap(), Value::Number(6.0));
//! ```

pub use cellgraph_core::{
    CellView, ErrorStyle, FormulaError, FormulaErrorKind, Position, Result, Sheet, SheetConfig,
    SheetError, Size, Value,
};
pub use cellgraph_core::sheet::{ESCAPE_SIGN, FORMULA_SIGN};
pub use cellgraph_engine::engine::{
    CellLookup, Formula, MAX_COLS, MAX_ROWS, ParseError, detect_cycle, parse_formula,
};
