//! Reads spreadsheet workbooks (`.xlsx`, `.xlsm`, `.xls`, `.ods`) into a `RawGrid`.

use crate::model::{Cell, RawGrid};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use calamine::{open_workbook_auto_from_rs, Data, DataType, Range, Reader};
use std::io::Cursor;
use tracing::debug;

/// Format used for date cells, matching how month headers are usually typed (`Jan 2024`).
const DATE_HEADER_FORMAT: &str = "%b %Y";

/// Loads the worksheet named `sheet`, or the first worksheet when `sheet` is `None`.
pub(crate) fn grid_from_workbook_bytes(bytes: &[u8], sheet: Option<&str>) -> Result<RawGrid> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| anyhow!("{e}"))
        .context("Unable to open the workbook")?;

    let sheet_names = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(name) => {
            if !sheet_names.iter().any(|n| n == name) {
                bail!(
                    "The workbook has no worksheet named '{name}', available: {}",
                    sheet_names.join(", ")
                );
            }
            name.to_string()
        }
        None => match sheet_names.first() {
            Some(first) => first.clone(),
            None => bail!("The workbook contains no worksheets"),
        },
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| anyhow!("{e}"))
        .with_context(|| format!("Unable to read worksheet '{name}'"))?;
    debug!(
        "Read worksheet '{name}' with {} rows and {} columns",
        range.height(),
        range.width()
    );
    Ok(grid_from_range(&range))
}

/// Converts a calamine range. Ranges start at their first used cell, so leading rows and columns
/// are padded back in to keep indices absolute.
fn grid_from_range(range: &Range<Data>) -> RawGrid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or_default();

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }
    RawGrid::new(rows)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Float(n) => Cell::Number(*n),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s.as_str()),
        Data::DateTime(dt) => match data.as_datetime() {
            Some(date) => Cell::text(date.format(DATE_HEADER_FORMAT).to_string()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::Bool(b) => Cell::text(if *b { "TRUE" } else { "FALSE" }),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RowCol;

    #[test]
    fn test_range_offset_is_padded() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 3));
        range.set_value((2, 1), Data::String("Income".into()));
        range.set_value((3, 2), Data::Float(3000.0));
        range.set_value((3, 3), Data::Int(12));
        let grid = grid_from_range(&range);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.get(RowCol::new(2, 1)), &Cell::Text("Income".into()));
        assert_eq!(grid.get(RowCol::new(3, 2)), &Cell::Number(3000.0));
        assert_eq!(grid.get(RowCol::new(3, 3)), &Cell::Number(12.0));
        assert_eq!(grid.get(RowCol::new(0, 0)), &Cell::Empty);
    }

    #[test]
    fn test_cell_mapping() {
        assert_eq!(to_cell(&Data::Bool(true)), Cell::Text("TRUE".into()));
        assert_eq!(to_cell(&Data::String("  ".into())), Cell::Empty);
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
        assert_eq!(
            to_cell(&Data::Error(calamine::CellErrorType::Div0)),
            Cell::Empty
        );
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        assert!(grid_from_workbook_bytes(b"not a workbook", None).is_err());
    }
}
