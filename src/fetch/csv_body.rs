// src/fetch/csv_body.rs

use csv::{ByteRecord, ReaderBuilder};

use crate::error::{FetchError, Result};
use crate::table::Table;

/// Parse a CSV body, taking its first record verbatim as the header row.
///
/// Works on raw bytes so upstream encodings other than UTF-8 still parse;
/// cells are decoded lossily for the returned table only. Ragged records
/// are rejected.
pub fn parse_csv(body: &[u8]) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(body);

    let headers: Vec<String> = lossy(rdr.byte_headers()?);
    if headers.is_empty() {
        return Err(FetchError::Parse("CSV body has no header row".to_string()));
    }

    let mut rows = Vec::new();
    for record in rdr.byte_records() {
        rows.push(lossy(&record?));
    }
    Ok(Table::new(headers, rows))
}

fn lossy(record: &ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}
