//! Cell position parsing and formatting.
//!
//! Provides bidirectional conversion between spreadsheet-style labels
//! (e.g., "A1", "B2", "AA100") and zero-indexed row/column coordinates.
//!
//! # Examples
//!
//! ```
//! use cellgraph_engine::engine::Position;
//!
//! let pos = Position::from_label("B3");
//! assert_eq!(pos.col, 1);  // 0-indexed
//! assert_eq!(pos.row, 2);
//! assert_eq!(pos.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

pub const MAX_ROWS: i32 = 16384;
pub const MAX_COLS: i32 = 16384;

const LETTERS: i64 = 26;

/// A zero-indexed cell position.
///
/// [`Position::NONE`] marks "no position" and is what parsing returns on
/// failure. It is never valid.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const NONE: Position = Position { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Position {
        Position { row, col }
    }

    pub fn is_valid(&self) -> bool {
        (0..MAX_ROWS).contains(&self.row) && (0..MAX_COLS).contains(&self.col)
    }

    /// Parse a label in spreadsheet notation (e.g., "A1", "AB12").
    ///
    /// Only uppercase `[A-Z]+[0-9]+` is accepted. Anything else, or a label
    /// outside the sheet bounds, yields [`Position::NONE`].
    pub fn from_label(label: &str) -> Position {
        Self::parse_a1(label).unwrap_or(Position::NONE)
    }

    fn parse_a1(label: &str) -> Option<Position> {
        let caps = label_re().captures(label)?;
        let letters = &caps["letters"];
        let numbers = &caps["numbers"];

        let mut col_acc = 0i64;
        for c in letters.bytes() {
            col_acc = col_acc * LETTERS + i64::from(c - b'A') + 1;
            if col_acc > i64::from(MAX_COLS) {
                return None;
            }
        }

        let row_acc = numbers.parse::<u64>().ok()?;
        if row_acc == 0 || row_acc > MAX_ROWS as u64 {
            return None;
        }

        let pos = Position::new((row_acc - 1) as i32, (col_acc - 1) as i32);
        pos.is_valid().then_some(pos)
    }

    /// Convert a column index to letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: i32) -> String {
        let mut result = String::new();
        let mut n = i64::from(col);
        while n >= 0 {
            result.insert(0, (b'A' + (n % LETTERS) as u8) as char);
            n = n / LETTERS - 1;
        }
        result
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::NONE
    }
}

fn label_re() -> &'static Regex {
    static LABEL_RE: OnceLock<Regex> = OnceLock::new();
    LABEL_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<numbers>[0-9]+)$")
            .expect("position label regex must compile")
    })
}

/// Lexicographic: row first, then column.
impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_a1(s).ok_or_else(|| format!("Invalid cell position: {}", s))
    }
}

/// Invalid positions format as the empty string.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return Ok(());
        }
        write!(f, "{}{}", Position::col_to_letters(self.col), self.row + 1)
    }
}

/// Dimensions of a rectangular area of the sheet.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub rows: i32,
    pub cols: i32,
}

impl Size {
    pub const fn new(rows: i32, cols: i32) -> Size {
        Size { rows, cols }
    }
}
