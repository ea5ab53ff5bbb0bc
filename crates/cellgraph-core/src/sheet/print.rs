//! Printable area and tab-separated dumps.

use std::io::Write;

use cellgraph_engine::engine::{Position, Size, Value};

use super::Sheet;
use crate::error::Result;

impl Sheet {
    /// Smallest `rows x cols` box holding every cell with non-empty text.
    /// Empty placeholders do not count.
    pub fn printable_size(&self) -> Size {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.raw_text().is_empty())
            .fold(Size::default(), |size, (pos, _)| Size {
                rows: size.rows.max(pos.row + 1),
                cols: size.cols.max(pos.col + 1),
            })
    }

    /// Write cell values as tab-separated rows.
    pub fn print_values<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(self.values_table().as_bytes())?;
        Ok(())
    }

    /// Write cell texts as tab-separated rows.
    pub fn print_texts<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(self.texts_table().as_bytes())?;
        Ok(())
    }

    /// Cell values over the printable area, tab-separated, one line per row.
    pub fn values_table(&self) -> String {
        self.table(|sheet, pos| sheet.render_value(&sheet.value_of(pos)))
    }

    /// Cell texts over the printable area, tab-separated, one line per row.
    pub fn texts_table(&self) -> String {
        self.table(|sheet, pos| sheet.cells.get(&pos).map(|c| c.raw_text()).unwrap_or_default())
    }

    fn render_value(&self, value: &Value) -> String {
        match value {
            Value::Error(err) => self.config.render_error(err).to_string(),
            other => other.to_string(),
        }
    }

    fn table(&self, render: impl Fn(&Sheet, Position) -> String) -> String {
        let size = self.printable_size();
        let mut out = String::new();
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    out.push('\t');
                }
                let pos = Position::new(row, col);
                if self.cells.contains_key(&pos) {
                    out.push_str(&render(self, pos));
                }
            }
            out.push('\n');
        }
        out
    }
}
