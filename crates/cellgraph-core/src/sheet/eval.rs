//! Lazy, memoized evaluation of formula cells.

use std::collections::HashSet;

use cellgraph_engine::engine::{CellLookup, Position, Value};

use super::Sheet;
use super::cell::{CellContent, ESCAPE_SIGN};

/// Resolves referenced cells through the sheet during evaluation.
struct SheetLookup<'a> {
    sheet: &'a Sheet,
}

impl CellLookup for SheetLookup<'_> {
    fn value_at(&self, pos: Position) -> Value {
        self.sheet.value_of(pos)
    }
}

impl Sheet {
    /// Current value at `pos`; missing entries read as empty.
    pub(crate) fn value_of(&self, pos: Position) -> Value {
        let Some(cell) = self.cells.get(&pos) else {
            return Value::Empty;
        };
        match cell.content() {
            CellContent::Empty => Value::Empty,
            CellContent::Text(text) => {
                let text = text.strip_prefix(ESCAPE_SIGN).unwrap_or(text);
                Value::Text(text.to_string())
            }
            CellContent::Formula(_) => {
                if let Some(value) = cell.cached() {
                    return value.clone();
                }
                self.evaluate_precedents(pos);
                self.evaluate_cell(pos).unwrap_or(Value::Empty)
            }
        }
    }

    /// Evaluate and memoize the formula at `pos`. Its precedents are read
    /// through the sheet, so any that are still uncached recurse.
    fn evaluate_cell(&self, pos: Position) -> Option<Value> {
        let cell = self.cells.get(&pos)?;
        let CellContent::Formula(formula) = cell.content() else {
            return None;
        };
        let lookup = SheetLookup { sheet: self };
        Some(
            cell.cache_or_init(|| Value::from(formula.evaluate(&lookup)))
                .clone(),
        )
    }

    /// Evaluate the uncached formula cells `root` reads from, deepest first,
    /// so that evaluating `root` itself only hits cached values.
    fn evaluate_precedents(&self, root: Position) {
        let mut visited: HashSet<Position> = HashSet::new();
        // (position, children already pushed)
        let mut stack: Vec<(Position, bool)> = vec![(root, false)];

        while let Some((pos, expanded)) = stack.pop() {
            if expanded {
                if pos != root {
                    self.evaluate_cell(pos);
                }
                continue;
            }
            if !visited.insert(pos) {
                continue;
            }
            let Some(cell) = self.cells.get(&pos) else {
                continue;
            };
            stack.push((pos, true));
            for &precedent in cell.referenced() {
                let pending = self
                    .cells
                    .get(&precedent)
                    .is_some_and(|c| c.needs_evaluation());
                if pending && !visited.contains(&precedent) {
                    stack.push((precedent, false));
                }
            }
        }
    }
}
