//! Walks the rows of each section and turns labeled positive amounts into records.
//!
//! Nothing in here fails. A cell that cannot be used is skipped, a row that cannot be used is
//! skipped, and the caller gets whatever remained.

use crate::model::{Category, LineItemRecord, RawGrid, RecordStore, RowCol};
use crate::parse::layout::{
    is_blank, Layout, FIRST_DATA_COLUMN, HEADER_ROW_OFFSET, LABEL_COLUMN, SECTION_BODY_OFFSET,
};
use crate::parse::SectionMarkers;
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::{debug, trace};

/// Maps data column index to its period label. Columns with a blank header are absent.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PeriodHeaders(BTreeMap<usize, String>);

impl PeriodHeaders {
    pub fn get(&self, col: usize) -> Option<&str> {
        self.0.get(&col).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The distinct labels in column order.
    pub fn distinct(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for label in self.0.values() {
            if !out.contains(label) {
                out.push(label.clone());
            }
        }
        out
    }
}

/// Reads the period headers from the row above the Income marker (row 0 if the marker is on the
/// first row).
pub fn read_period_headers(grid: &RawGrid, markers: &SectionMarkers) -> PeriodHeaders {
    let header_row = markers.income_row.saturating_sub(HEADER_ROW_OFFSET);
    let headers = (FIRST_DATA_COLUMN..grid.width())
        .filter_map(|col| {
            let text = grid.get(RowCol::new(header_row, col)).as_text()?;
            if is_blank(&text) {
                trace!("Ignoring column {col} which has no period header");
                return None;
            }
            Some((col, text))
        })
        .collect();
    PeriodHeaders(headers)
}

/// Rows holding income line items: `[income_row + 2, expense_row)`.
fn income_rows(markers: &SectionMarkers) -> Range<usize> {
    let start = markers.income_row + SECTION_BODY_OFFSET;
    start..markers.expense_row.max(start)
}

/// Rows holding expense line items: `[expense_row + 2, end of grid)`.
fn expense_rows(grid: &RawGrid, markers: &SectionMarkers) -> Range<usize> {
    let start = markers.expense_row + SECTION_BODY_OFFSET;
    start..grid.height().max(start)
}

/// Extracts every usable line item from both sections.
pub fn extract(
    grid: &RawGrid,
    markers: &SectionMarkers,
    headers: &PeriodHeaders,
    layout: &Layout,
) -> RecordStore {
    let mut records = Vec::new();
    extract_section(
        grid,
        Category::Income,
        income_rows(markers),
        headers,
        layout,
        &mut records,
    );
    extract_section(
        grid,
        Category::Expense,
        expense_rows(grid, markers),
        headers,
        layout,
        &mut records,
    );
    debug!(
        "Extracted {} records across {} periods",
        records.len(),
        headers.distinct().len()
    );
    RecordStore::new(headers.distinct(), records)
}

fn extract_section(
    grid: &RawGrid,
    category: Category,
    rows: Range<usize>,
    headers: &PeriodHeaders,
    layout: &Layout,
    out: &mut Vec<LineItemRecord>,
) {
    for row in rows {
        let Some(label) = row_label(grid, row, layout) else {
            continue;
        };
        for col in FIRST_DATA_COLUMN..grid.width() {
            let Some(period) = headers.get(col) else {
                continue;
            };
            let at = RowCol::new(row, col);
            let amount = match grid.get(at).as_amount() {
                Some(amount) if amount.is_positive() => amount,
                _ => {
                    trace!("Skipping cell {at} of '{label}'");
                    continue;
                }
            };
            out.push(LineItemRecord {
                category,
                label: label.clone(),
                period: period.to_string(),
                amount,
                cell: at,
            });
        }
    }
}

/// The label of a line-item row, or `None` for blank and subtotal rows.
fn row_label(grid: &RawGrid, row: usize, layout: &Layout) -> Option<String> {
    let label = grid.get(RowCol::new(row, LABEL_COLUMN)).as_text()?;
    if is_blank(&label) {
        return None;
    }
    if layout.is_subtotal(&label) {
        trace!("Skipping subtotal row '{label}'");
        return None;
    }
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Cell};
    use crate::parse::locate;
    use crate::test::grid_from_csv;
    use rust_decimal::Decimal;

    fn run(csv: &str) -> RecordStore {
        let grid = grid_from_csv(csv);
        let layout = Layout::default();
        let markers = locate(&grid, &layout).unwrap();
        let headers = read_period_headers(&grid, &markers);
        extract(&grid, &markers, &headers, &layout)
    }

    #[test]
    fn test_headers_skip_blank_and_nan() {
        let grid = grid_from_csv(",,Jan,,nan,Mar\n,Income\n");
        let markers = SectionMarkers {
            income_row: 1,
            expense_row: 5,
        };
        let headers = read_period_headers(&grid, &markers);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get(2), Some("Jan"));
        assert_eq!(headers.get(3), None);
        assert_eq!(headers.get(4), None);
        assert_eq!(headers.get(5), Some("Mar"));
    }

    #[test]
    fn test_headers_clamp_to_first_row() {
        let grid = grid_from_csv(",Income,Jan,Feb\n,,\n,Salary,1,2\n,Expenses\n");
        let markers = locate(&grid, &Layout::default()).unwrap();
        assert_eq!(markers.income_row, 0);
        let headers = read_period_headers(&grid, &markers);
        assert_eq!(headers.distinct(), vec!["Jan".to_string(), "Feb".to_string()]);
    }

    #[test]
    fn test_headers_ignore_label_columns() {
        let grid = grid_from_csv("Year,Label,Jan\n,Income\n");
        let markers = SectionMarkers {
            income_row: 1,
            expense_row: 3,
        };
        let headers = read_period_headers(&grid, &markers);
        assert_eq!(headers.get(0), None);
        assert_eq!(headers.get(1), None);
        assert_eq!(headers.distinct(), vec!["Jan".to_string()]);
    }

    #[test]
    fn test_numeric_headers_render_as_text() {
        let grid = RawGrid::new(vec![
            vec![Cell::Empty, Cell::Empty, Cell::Number(2023.0), Cell::Number(2024.0)],
            vec![Cell::Empty, Cell::text("Income")],
        ]);
        let markers = SectionMarkers {
            income_row: 1,
            expense_row: 2,
        };
        let headers = read_period_headers(&grid, &markers);
        assert_eq!(headers.distinct(), vec!["2023".to_string(), "2024".to_string()]);
    }

    #[test]
    fn test_scenario_sheet() {
        let store = run(crate::test::SCENARIO_SHEET);
        assert_eq!(store.len(), 4);
        assert_eq!(store.periods(), &["Jan".to_string(), "Feb".to_string()]);
        assert!(store.records().iter().all(|r| !r.label.contains("Total")));
        let rent: Vec<_> = store
            .by_category(Category::Expense)
            .map(|r| (r.period.as_str(), r.amount, r.cell))
            .collect();
        assert_eq!(
            rent,
            vec![
                ("Jan", Amount::new(Decimal::from(800)), RowCol::new(8, 2)),
                ("Feb", Amount::new(Decimal::from(800)), RowCol::new(8, 3)),
            ]
        );
    }

    #[test]
    fn test_skips_zero_negative_and_text_cells() {
        let store = run(
            ",,Jan,Feb,Mar,Apr\n\
             ,Income\n\
             ,\n\
             ,Salary,3000,0,-5,abc\n\
             ,Expenses\n\
             ,\n\
             ,Rent,800,,800 €,\n",
        );
        let amounts: Vec<(Category, &str)> = store
            .records()
            .iter()
            .map(|r| (r.category, r.period.as_str()))
            .collect();
        assert_eq!(
            amounts,
            vec![
                (Category::Income, "Jan"),
                (Category::Expense, "Jan"),
                (Category::Expense, "Mar"),
            ]
        );
        assert!(store.records().iter().all(|r| r.amount.is_positive()));
    }

    #[test]
    fn test_skips_blank_nan_and_subtotal_labels() {
        let store = run(
            ",,Jan\n\
             ,Income\n\
             ,\n\
             ,Salary,3000\n\
             ,,500\n\
             ,nan,500\n\
             ,Total income,3000\n\
             ,Expenses\n\
             ,\n\
             ,Rent,800\n\
             ,Total Expenses,800\n\
             ,Food total,300\n",
        );
        let labels: Vec<&str> = store.records().iter().map(|r| r.label.as_str()).collect();
        // "Food total" has a lowercase marker and is kept.
        assert_eq!(labels, vec!["Salary", "Rent", "Food total"]);
    }

    #[test]
    fn test_headerless_column_is_ignored_even_with_positive_values() {
        let store = run(
            ",,Jan,,nan\n\
             ,Income\n\
             ,\n\
             ,Salary,3000,3000,3000\n\
             ,Expenses\n\
             ,\n\
             ,Rent,800,800,800\n",
        );
        assert_eq!(store.len(), 2);
        assert!(store.records().iter().all(|r| r.period == "Jan"));
        assert_eq!(store.periods().len(), 1);
    }

    #[test]
    fn test_row_right_below_marker_is_skipped() {
        let store = run(
            ",,Jan\n\
             ,Income\n\
             ,Bonus,100\n\
             ,Salary,3000\n\
             ,Expenses\n\
             ,Deposit,50\n\
             ,Rent,800\n",
        );
        let labels: Vec<&str> = store.records().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Salary", "Rent"]);
    }

    #[test]
    fn test_adjacent_markers_give_empty_income_section() {
        let store = run(
            ",,Jan\n\
             ,Income\n\
             ,Expenses\n\
             ,\n\
             ,Rent,800\n",
        );
        assert_eq!(store.by_category(Category::Income).count(), 0);
        assert_eq!(store.by_category(Category::Expense).count(), 1);
    }

    #[test]
    fn test_duplicate_labels_are_kept() {
        let store = run(
            ",,Jan\n\
             ,Income\n\
             ,\n\
             ,Salary,1000\n\
             ,Salary,500\n\
             ,Expenses\n\
             ,\n",
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_headers_count_once() {
        let store = run(
            ",,Jan,Jan\n\
             ,Income\n\
             ,\n\
             ,Salary,1000,500\n\
             ,Expenses\n\
             ,\n",
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.periods(), &["Jan".to_string()]);
    }
}
