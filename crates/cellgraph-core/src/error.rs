//! Error types for cellgraph core.

use thiserror::Error;

use cellgraph_engine::engine::{ParseError, Position};

/// Errors that can occur when editing or dumping a sheet.
///
/// Every edit that fails with one of these leaves the sheet unchanged.
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Invalid position (row {}, col {})", .0.row, .0.col)]
    InvalidPosition(Position),

    #[error("Formula parse error: {0}")]
    FormulaParse(#[from] ParseError),

    #[error("Formula in {cell} references a cell outside the sheet")]
    InvalidReference { cell: Position },

    #[error("Circular dependency detected: {}", format_path(.path))]
    CircularDependency { cell: Position, path: Vec<Position> },

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_path(path: &[Position]) -> String {
    path.iter()
        .map(|pos| pos.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, SheetError>;
