//! Reads `.csv` uploads into a `RawGrid`.

use crate::model::RawGrid;
use crate::Result;
use anyhow::Context;
use std::io::Cursor;

/// Loads CSV bytes. There is no header row and rows may have different lengths.
pub(crate) fn grid_from_csv_bytes(bytes: &[u8]) -> Result<RawGrid> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(bytes));

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Unable to read CSV row {}", i + 1))?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }
    Ok(RawGrid::from_strings(rows))
}
