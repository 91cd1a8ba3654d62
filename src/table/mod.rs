// src/table/mod.rs

pub mod html;
pub mod locate;

pub use html::parse_tables;
pub use locate::{locate, locate_weekly, normalize_weekly, WEEKLY_COLUMNS, WEEK_OF_MARKER};

/// An ordered grid of string cells.
///
/// Tables scraped from HTML carry no headers: every `<tr>` is a row, header
/// rows included. Headers get assigned once the table has been located and
/// normalized, or come verbatim from a CSV body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// True if any header or cell contains `needle` as a substring.
    pub fn contains(&self, needle: &str) -> bool {
        self.headers.iter().any(|h| h.contains(needle))
            || self
                .rows
                .iter()
                .any(|row| row.iter().any(|cell| cell.contains(needle)))
    }
}
