use std::collections::HashMap;

use cellgraph_engine::engine::{Position, Value};

use super::cell::{Cell, CellView};
use crate::config::SheetConfig;
use crate::error::{Result, SheetError};

/// A single sheet: the table of cells keyed by position.
///
/// The table is the only owner of its cells. A cell exists while it has
/// content or while another formula still references it; in the latter case
/// it is an empty placeholder holding the back-edges.
#[derive(Debug, Default)]
pub struct Sheet {
    pub(crate) cells: HashMap<Position, Cell>,
    pub(crate) config: SheetConfig,
}

impl Sheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SheetConfig) -> Self {
        Sheet {
            cells: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    /// Number of table entries, placeholders included.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read-only view of the cell at `pos`, or `None` if no entry exists.
    pub fn cell(&self, pos: Position) -> Result<Option<CellView<'_>>> {
        check_position(pos)?;
        Ok(self
            .cells
            .get(&pos)
            .map(|cell| CellView::new(self, pos, cell)))
    }

    /// Value at `pos`; [`Value::Empty`] if no entry exists.
    pub fn value(&self, pos: Position) -> Result<Value> {
        check_position(pos)?;
        Ok(self.value_of(pos))
    }

    /// Text at `pos`; empty if no entry exists.
    pub fn text(&self, pos: Position) -> Result<String> {
        check_position(pos)?;
        Ok(self
            .cells
            .get(&pos)
            .map(|cell| cell.raw_text())
            .unwrap_or_default())
    }
}

pub(crate) fn check_position(pos: Position) -> Result<()> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(SheetError::InvalidPosition(pos))
    }
}
