//! Turns a loosely structured budget sheet into a `RecordStore`.
//!
//! Parsing runs in two steps. `locate` finds the Income and Expense markers and fails fast when
//! the sheet does not look like a budget template. `extract` then reads line items defensively,
//! skipping anything it cannot use.

mod extractor;
mod layout;
mod locator;

pub use extractor::{extract, read_period_headers, PeriodHeaders};
pub use layout::{
    Layout, FIRST_DATA_COLUMN, HEADER_ROW_OFFSET, LABEL_COLUMN, NAN_LABEL, SECTION_BODY_OFFSET,
};
pub use locator::{locate, SectionMarkers, StructureError};

use crate::model::{RawGrid, RecordStore};
use tracing::warn;

/// Parses `grid` into records.
///
/// `Ok` with an empty store means the sheet has a recognizable structure but no usable amounts.
/// `Err` means the structure was not recognized and the sheet must not be analyzed.
pub fn parse_grid(grid: &RawGrid, layout: &Layout) -> Result<RecordStore, StructureError> {
    let markers = locate(grid, layout).inspect_err(|e| warn!("Unable to parse sheet: {e}"))?;
    let headers = read_period_headers(grid, &markers);
    Ok(extract(grid, &markers, &headers, layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, RowCol};
    use crate::test::{grid_from_csv, SCENARIO_SHEET};

    #[test]
    fn test_missing_expense_is_distinct_from_empty() {
        let missing = grid_from_csv(",,Jan\n,Income\n,\n,Salary,3000\n");
        assert_eq!(
            parse_grid(&missing, &Layout::default()),
            Err(StructureError::MissingExpenseMarker)
        );

        let empty = grid_from_csv(",,Jan\n,Income\n,\n,Expenses\n,\n");
        let store = parse_grid(&empty, &Layout::default()).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.periods(), &["Jan".to_string()]);
    }

    #[test]
    fn test_distinct_periods_match_header_columns() {
        let grid = grid_from_csv(
            ",,Jan,Feb,,Apr,nan,Jun\n\
             ,Income\n\
             ,\n\
             ,Salary,1,1,1,1,1,\n\
             ,Expenses\n\
             ,\n\
             ,Rent,1,,1,1,1,1\n",
        );
        let store = parse_grid(&grid, &Layout::default()).unwrap();
        assert_eq!(store.periods().len(), 4);
        assert!(store
            .records()
            .iter()
            .all(|r| store.periods().contains(&r.period)));
    }

    #[test]
    fn test_invariants_hold_for_scenario() {
        let grid = grid_from_csv(SCENARIO_SHEET);
        let layout = Layout::default();
        let store = parse_grid(&grid, &layout).unwrap();
        for record in store.records() {
            assert!(record.amount.is_positive());
            assert!(!layout.is_subtotal(&record.label));
            assert!(record.cell.col() >= FIRST_DATA_COLUMN);
        }
        let salary = store.by_category(Category::Income).next().unwrap();
        assert_eq!(salary.label, "Salary");
        assert_eq!(salary.cell, RowCol::new(4, 2));
    }

    #[test]
    fn test_custom_layout() {
        let grid = grid_from_csv(
            ",,Q1\n\
             ,Revenue\n\
             ,\n\
             ,Consulting,9000\n\
             ,Sum revenue,9000\n\
             ,Costs\n\
             ,\n\
             ,Office,1000\n",
        );
        let layout = Layout {
            income_markers: vec!["revenue".into()],
            expense_markers: vec!["costs".into()],
            subtotal_markers: vec!["Sum".into()],
        };
        let store = parse_grid(&grid, &layout).unwrap();
        let labels: Vec<&str> = store.records().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Consulting", "Office"]);
    }
}
