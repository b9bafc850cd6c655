//! Finds the Income and Expense section markers in the label column.

use crate::model::{RawGrid, RowCol};
use crate::parse::layout::{Layout, LABEL_COLUMN};
use std::error::Error;
use std::fmt::{Display, Formatter};
use tracing::debug;

/// The row indices of the two section markers. `income_row < expense_row` always holds for a
/// value returned by `locate`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SectionMarkers {
    pub income_row: usize,
    pub expense_row: usize,
}

/// The sheet does not have a structure we can recognize. Nothing should be extracted from it.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StructureError {
    MissingIncomeMarker,
    MissingExpenseMarker,
    /// The Expense marker was found on or above the Income marker, so the income section would be
    /// nonsensical.
    ExpenseBeforeIncome { income_row: usize, expense_row: usize },
}

impl Display for StructureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StructureError::MissingIncomeMarker => {
                write!(f, "No Income section marker was found in column B")
            }
            StructureError::MissingExpenseMarker => {
                write!(f, "No Expense section marker was found in column B")
            }
            StructureError::ExpenseBeforeIncome {
                income_row,
                expense_row,
            } => write!(
                f,
                "The Expense section ({}) must come after the Income section ({})",
                RowCol::new(*expense_row, LABEL_COLUMN),
                RowCol::new(*income_row, LABEL_COLUMN)
            ),
        }
    }
}

impl Error for StructureError {}

/// Scans the label column top to bottom for the first income marker and, independently, the first
/// expense marker.
pub fn locate(grid: &RawGrid, layout: &Layout) -> Result<SectionMarkers, StructureError> {
    let find = |is_marker: &dyn Fn(&str) -> bool| {
        (0..grid.height()).find(|&row| {
            grid.get(RowCol::new(row, LABEL_COLUMN))
                .as_text()
                .is_some_and(|text| is_marker(&text))
        })
    };

    let income_row = find(&|text: &str| layout.is_income_marker(text));
    let expense_row = find(&|text: &str| layout.is_expense_marker(text));

    let markers = match (income_row, expense_row) {
        (None, _) => return Err(StructureError::MissingIncomeMarker),
        (_, None) => return Err(StructureError::MissingExpenseMarker),
        (Some(income_row), Some(expense_row)) if expense_row <= income_row => {
            return Err(StructureError::ExpenseBeforeIncome {
                income_row,
                expense_row,
            })
        }
        (Some(income_row), Some(expense_row)) => SectionMarkers {
            income_row,
            expense_row,
        },
    };

    debug!(
        "Found income marker at {} and expense marker at {}",
        RowCol::new(markers.income_row, LABEL_COLUMN),
        RowCol::new(markers.expense_row, LABEL_COLUMN)
    );
    Ok(markers)
}
