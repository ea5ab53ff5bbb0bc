//! Cell data structures for the sheet.
//!
//! - [`CellContent`] - What a cell holds (empty, text, or formula)
//! - [`Cell`] - Content plus memoized value and dependency edges
//! - [`CellView`] - Read-only handle handed to callers
//!
//! Edge and cache mutation on [`Cell`] is crate-private; only the sheet's
//! edit protocol touches it.

use std::cell::OnceCell;
use std::collections::HashSet;

use cellgraph_engine::engine::{Formula, ParseError, Position, Value, parse_formula};

use super::Sheet;

/// Leading character that marks a formula.
pub const FORMULA_SIGN: char = '=';
/// Leading character that forces literal text. Kept in the raw text, dropped
/// from the value.
pub const ESCAPE_SIGN: char = '\'';

/// The content stored in a cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum CellContent {
    #[default]
    Empty,
    Text(String),
    Formula(Formula),
}

impl CellContent {
    /// Parse user input.
    /// - Empty string -> Empty
    /// - Starts with '=' -> Formula (expression after the '=')
    /// - Otherwise -> Text, verbatim
    pub(crate) fn parse(input: &str) -> Result<CellContent, ParseError> {
        if input.is_empty() {
            return Ok(CellContent::Empty);
        }
        if let Some(expression) = input.strip_prefix(FORMULA_SIGN) {
            return Ok(CellContent::Formula(parse_formula(expression)?));
        }
        Ok(CellContent::Text(input.to_string()))
    }

    pub(crate) fn referenced(&self) -> &[Position] {
        match self {
            CellContent::Formula(formula) => formula.referenced_cells(),
            _ => &[],
        }
    }
}

/// A cell in the sheet.
#[derive(Debug, Default)]
pub(crate) struct Cell {
    content: CellContent,
    /// Memoized value; only ever set for formula cells.
    cache: OnceCell<Value>,
    /// Cells whose formulas read this one.
    dependents: HashSet<Position>,
}

impl Cell {
    pub(crate) fn content(&self) -> &CellContent {
        &self.content
    }

    /// Replace the content and drop this cell's own cached value.
    pub(crate) fn set_content(&mut self, content: CellContent) {
        self.content = content;
        self.cache.take();
    }

    pub(crate) fn is_empty(&self) -> bool {
        matches!(self.content, CellContent::Empty)
    }

    /// Text as the user would edit it.
    pub(crate) fn raw_text(&self) -> String {
        match &self.content {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(formula) => format!("{}{}", FORMULA_SIGN, formula.expression()),
        }
    }

    /// Cells this cell's formula reads.
    pub(crate) fn referenced(&self) -> &[Position] {
        self.content.referenced()
    }

    pub(crate) fn dependents(&self) -> &HashSet<Position> {
        &self.dependents
    }

    pub(crate) fn add_dependent(&mut self, pos: Position) {
        self.dependents.insert(pos);
    }

    pub(crate) fn remove_dependent(&mut self, pos: Position) {
        self.dependents.remove(&pos);
    }

    pub(crate) fn cached(&self) -> Option<&Value> {
        self.cache.get()
    }

    /// Memoize a formula result, computing it if absent.
    pub(crate) fn cache_or_init(&self, compute: impl FnOnce() -> Value) -> &Value {
        self.cache.get_or_init(compute)
    }

    /// Returns true if a cached value was dropped.
    pub(crate) fn invalidate_cache(&mut self) -> bool {
        self.cache.take().is_some()
    }

    /// Whether reading this cell would have to evaluate a formula.
    pub(crate) fn needs_evaluation(&self) -> bool {
        matches!(self.content, CellContent::Formula(_)) && self.cache.get().is_none()
    }
}

/// Read-only view of a cell, borrowed from its sheet.
#[derive(Clone, Copy)]
pub struct CellView<'a> {
    sheet: &'a Sheet,
    pos: Position,
    cell: &'a Cell,
}

impl<'a> CellView<'a> {
    pub(crate) fn new(sheet: &'a Sheet, pos: Position, cell: &'a Cell) -> Self {
        CellView { sheet, pos, cell }
    }

    pub fn position(&self) -> Position {
        self.pos
    }

    /// The cell's value, evaluating and memoizing a formula if needed.
    pub fn value(&self) -> Value {
        self.sheet.value_of(self.pos)
    }

    /// The cell's text: raw text for literals, `=` plus the canonical
    /// expression for formulas.
    pub fn text(&self) -> String {
        self.cell.raw_text()
    }

    /// Positions this cell's formula reads, ascending. Empty for non-formulas.
    pub fn referenced_cells(&self) -> &'a [Position] {
        self.cell.referenced()
    }

    /// Positions whose formulas read this cell, ascending.
    pub fn dependent_cells(&self) -> Vec<Position> {
        let mut dependents: Vec<Position> = self.cell.dependents().iter().copied().collect();
        dependents.sort();
        dependents
    }

    pub fn has_cached_value(&self) -> bool {
        self.cell.cached().is_some()
    }
}

impl std::fmt::Debug for CellView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellView")
            .field("pos", &self.pos)
            .field("text", &self.cell.raw_text())
            .finish()
    }
}
