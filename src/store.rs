// src/store.rs

use csv::{ReaderBuilder, Writer};
use std::{
    fs,
    io::{self, Write},
    path::Path,
};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{FetchError, Result};
use crate::table::Table;

/// Serialize `table` (headers first) as CSV at `path`, replacing any
/// existing file.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut wtr = Writer::from_writer(Vec::new());
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| FetchError::io(path, io::Error::new(e.error().kind(), e.to_string())))?;
    write_raw(path, &bytes)
}

/// Persist `bytes` verbatim at `path`.
///
/// Parent directories are created as needed. The content goes to a temp file
/// in the same directory first and is renamed over the target, so readers
/// never see a partial file and the last writer wins.
pub fn write_raw(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| FetchError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| FetchError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| FetchError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| FetchError::io(path, e.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

/// Read a CSV file written by [`write_table`] back into a [`Table`].
pub fn read_table(path: &Path) -> Result<Table> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let headers = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(Table::new(headers, rows))
}
