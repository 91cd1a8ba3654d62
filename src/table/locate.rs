// src/table/locate.rs
//! Finds the weekly price table among the unlabeled tables of an HTML page
//! by scanning for a marker string instead of trusting table/row positions.

use tracing::{debug, warn};

use super::{parse_tables, Table};
use crate::error::{FetchError, Result};

pub const WEEK_OF_MARKER: &str = "Week Of";
pub const WEEKLY_COLUMNS: [&str; 6] = ["week_of", "mon", "tue", "wed", "thu", "fri"];

/// First table, in document order, with any cell containing `marker`.
pub fn locate(tables: Vec<Table>, marker: &str) -> Result<Table> {
    let total = tables.len();
    tables
        .into_iter()
        .enumerate()
        .find(|(_, t)| t.contains(marker))
        .map(|(idx, t)| {
            debug!(index = idx, candidates = total, "located table");
            t
        })
        .ok_or_else(|| FetchError::TableNotFound {
            marker: marker.to_string(),
        })
}

/// Reshape a located table into the fixed six-column weekly layout.
///
/// The first row whose first cell is exactly `marker` (after trimming) is
/// the header; it and everything above it are dropped. Rows are cut to six
/// cells and short rows are padded with blanks.
pub fn normalize_weekly(table: Table, marker: &str) -> Table {
    let mut rows = table.rows;

    match rows
        .iter()
        .position(|row| row.first().map(|c| c.trim()) == Some(marker))
    {
        Some(header_idx) => {
            rows.drain(..=header_idx);
        }
        None => warn!(marker, "no exact header row; keeping all rows"),
    }

    let width = WEEKLY_COLUMNS.len();
    for row in &mut rows {
        row.resize(width, String::new());
    }

    Table::new(WEEKLY_COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
}

/// Parse, locate and normalize the weekly table in one step.
pub fn locate_weekly(html: &str) -> Result<Table> {
    let tables = parse_tables(html);
    let table = locate(tables, WEEK_OF_MARKER)?;
    Ok(normalize_weekly(table, WEEK_OF_MARKER))
}
