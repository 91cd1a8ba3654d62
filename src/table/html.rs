// src/table/html.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::trace;

use super::Table;

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("table selector should parse"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("tr selector should parse"));

// Guards against absurd colspan values in hostile markup.
const MAX_COLSPAN: usize = 256;

/// Parse every `<table>` in `html`, in document order, into a header-less
/// [`Table`]. Nested tables come out as their own candidates and their rows
/// are not mixed into the enclosing table. Tables without rows are skipped.
pub fn parse_tables(html: &str) -> Vec<Table> {
    let document = Html::parse_document(html);

    document
        .select(&TABLE_SELECTOR)
        .filter_map(|table| {
            let rows: Vec<Vec<String>> = table
                .select(&ROW_SELECTOR)
                .filter(|tr| is_owned_by(tr, &table))
                .map(|tr| row_cells(&tr))
                .collect();
            trace!(rows = rows.len(), "parsed candidate table");
            if rows.is_empty() {
                None
            } else {
                Some(Table::new(Vec::new(), rows))
            }
        })
        .collect()
}

/// True if `table` is the nearest `<table>` ancestor of `tr`.
fn is_owned_by(tr: &ElementRef, table: &ElementRef) -> bool {
    tr.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
        .map_or(false, |e| e.id() == table.id())
}

/// Direct `<td>`/`<th>` children, with `colspan` expanded by repetition.
fn row_cells(tr: &ElementRef) -> Vec<String> {
    let mut cells = Vec::new();
    for cell in tr.children().filter_map(ElementRef::wrap) {
        if !matches!(cell.value().name(), "td" | "th") {
            continue;
        }
        let text = cell_text(&cell);
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(1)
            .min(MAX_COLSPAN);
        for _ in 1..span {
            cells.push(text.clone());
        }
        cells.push(text);
    }
    cells
}

fn cell_text(cell: &ElementRef) -> String {
    let raw: String = cell.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
