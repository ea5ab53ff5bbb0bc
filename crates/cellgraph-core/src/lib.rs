//! cellgraph-core - Sheet storage, transactional edits and cache invalidation.

pub mod config;
pub mod error;
pub mod sheet;

pub use config::{ErrorStyle, SheetConfig};
pub use error::{Result, SheetError};
pub use sheet::{CellView, Sheet};

pub use cellgraph_engine::engine::{FormulaError, FormulaErrorKind, Position, Size, Value};
