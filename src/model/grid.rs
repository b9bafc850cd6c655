//! The untyped cell grid exactly as it was read from an uploaded spreadsheet.

use crate::model::{Amount, RowCol};
use std::str::FromStr;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Creates a text cell, or `Empty` when `s` is blank.
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The cell rendered as trimmed text. Whole numbers render without a fractional part so that a
    /// year typed as a header (`2024`) reads as `2024` and not `2024.0`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Cell::Number(n) if !n.is_finite() => None,
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Cell::Number(n) => Some(n.to_string()),
        }
    }

    /// The cell as a monetary amount. Anything that does not look like a number is `None`.
    pub fn as_amount(&self) -> Option<Amount> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Amount::from_f64(*n),
            Cell::Text(s) => Amount::from_str(s).ok(),
        }
    }
}

/// A two-dimensional, zero-indexed grid of cells. Rows may have different lengths; reading past
/// the end of a row yields `Cell::Empty`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Builds a grid of text cells from string rows, such as the records of a CSV file.
    pub fn from_strings<S, R, I>(rows: I) -> Self
    where
        S: Into<String>,
        R: IntoIterator<Item = S>,
        I: IntoIterator<Item = R>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Cell::text).collect())
                .collect(),
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn get(&self, at: RowCol) -> &Cell {
        self.rows
            .get(at.row())
            .and_then(|row| row.get(at.col()))
            .unwrap_or(&EMPTY)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }
}
