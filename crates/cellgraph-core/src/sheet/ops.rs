//! Transactional edits.
//!
//! An edit is staged and validated in full before anything is written:
//! position, formula syntax, reference bounds, then cycle detection against
//! the graph as it would look after the edit. Only a fully validated edit is
//! committed, so a rejected edit leaves the sheet untouched and there is
//! nothing to roll back.

use std::collections::HashSet;

use cellgraph_engine::engine::{Position, detect_cycle};
use tracing::{debug, trace};

use super::Sheet;
use super::cell::CellContent;
use super::state::check_position;
use crate::error::{Result, SheetError};

/// An edit that has passed every check and is ready to commit.
struct StagedEdit {
    pos: Position,
    content: CellContent,
}

impl Sheet {
    /// Set the cell at `pos` from user input.
    ///
    /// Empty input stores an empty cell, input starting with `=` is parsed as
    /// a formula, anything else is stored as text.
    pub fn set_cell(&mut self, pos: Position, text: &str) -> Result<()> {
        let edit = self.stage(pos, text).inspect_err(|err| {
            debug!(cell = %pos, error = %err, "edit rejected");
        })?;
        self.commit(edit);
        Ok(())
    }

    /// Clear the cell at `pos`.
    ///
    /// The entry is removed unless other formulas still reference it, in
    /// which case it stays as an empty placeholder. Clearing a missing cell
    /// is a no-op.
    pub fn clear_cell(&mut self, pos: Position) -> Result<()> {
        check_position(pos)?;
        let Some(cell) = self.cells.get(&pos) else {
            return Ok(());
        };
        if !cell.is_empty() {
            self.commit(StagedEdit {
                pos,
                content: CellContent::Empty,
            });
        }
        self.collect_if_unused(pos);
        Ok(())
    }

    fn stage(&self, pos: Position, text: &str) -> Result<StagedEdit> {
        check_position(pos)?;
        let content = CellContent::parse(text)?;

        let references = content.referenced();
        if references.iter().any(|r| !r.is_valid()) {
            return Err(SheetError::InvalidReference { cell: pos });
        }

        if !references.is_empty() {
            let cycle = detect_cycle(pos, |at| {
                if at == pos {
                    references.to_vec()
                } else {
                    self.cells
                        .get(&at)
                        .map(|cell| cell.referenced().to_vec())
                        .unwrap_or_default()
                }
            });
            if let Some(path) = cycle {
                return Err(SheetError::CircularDependency { cell: pos, path });
            }
        }

        Ok(StagedEdit { pos, content })
    }

    fn commit(&mut self, edit: StagedEdit) {
        let StagedEdit { pos, content } = edit;

        let old_refs: Vec<Position> = self
            .cells
            .get(&pos)
            .map(|cell| cell.referenced().to_vec())
            .unwrap_or_default();
        let new_refs: Vec<Position> = content.referenced().to_vec();

        self.cells.entry(pos).or_default().set_content(content);

        // Reference lists are sorted, so membership is a binary search.
        for &added in new_refs.iter().filter(|r| old_refs.binary_search(r).is_err()) {
            // Creates an empty placeholder if the referenced cell is new.
            self.cells.entry(added).or_default().add_dependent(pos);
        }
        for &removed in old_refs.iter().filter(|r| new_refs.binary_search(r).is_err()) {
            if let Some(cell) = self.cells.get_mut(&removed) {
                cell.remove_dependent(pos);
            }
            self.collect_if_unused(removed);
        }

        debug!(cell = %pos, references = new_refs.len(), "edit committed");
        self.invalidate_from(pos);
    }

    /// Drop the cached value of `pos` and of every cell that transitively
    /// depends on it.
    fn invalidate_from(&mut self, pos: Position) {
        let mut pending = vec![pos];
        let mut visited: HashSet<Position> = HashSet::new();
        let mut dropped = 0usize;

        while let Some(current) = pending.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(cell) = self.cells.get_mut(&current) else {
                continue;
            };
            if cell.invalidate_cache() {
                dropped += 1;
            }
            pending.extend(
                cell.dependents()
                    .iter()
                    .copied()
                    .filter(|d| !visited.contains(d)),
            );
        }

        trace!(cell = %pos, visited = visited.len(), dropped, "caches invalidated");
    }

    /// Remove the entry at `pos` if it is empty and nothing references it.
    fn collect_if_unused(&mut self, pos: Position) {
        let unused = self
            .cells
            .get(&pos)
            .is_some_and(|cell| cell.is_empty() && cell.dependents().is_empty());
        if unused {
            self.cells.remove(&pos);
            debug!(cell = %pos, "cell collected");
        }
    }
}
