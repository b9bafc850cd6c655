//! The template contract of a budget sheet.
//!
//! ```text
//!      A   B                C      D      ...
//!  0       (title)
//!  1       (anything)       Jan    Feb          <- period headers, HEADER_ROW_OFFSET above
//!  2       Income                               <- income marker
//!  3       (column titles)                      <- skipped by SECTION_BODY_OFFSET
//!  4       Salary           3000   3000         <- income line items
//!  5       Total income     3000   3000         <- subtotal, never extracted
//!  6       Expenses                             <- expense marker
//!  7       (column titles)
//!  8       Rent             800    800          <- expense line items, to the end of the sheet
//! ```

use serde::{Deserialize, Serialize};

/// Column holding section markers and line-item labels (column B).
pub const LABEL_COLUMN: usize = 1;

/// First column holding period amounts (column C).
pub const FIRST_DATA_COLUMN: usize = 2;

/// The period header row sits this many rows above the Income marker.
pub const HEADER_ROW_OFFSET: usize = 1;

/// Line items start this many rows below each section marker: the marker row itself plus one
/// header or blank row.
pub const SECTION_BODY_OFFSET: usize = 2;

/// Labels (and headers) with this exact text are treated as blank. Sheets that went through a
/// dataframe export carry it in place of empty cells.
pub const NAN_LABEL: &str = "nan";

/// Words that identify section markers and subtotal rows. The defaults cover English and Finnish
/// templates.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Case-insensitive substrings that mark the Income section.
    pub income_markers: Vec<String>,
    /// Case-insensitive substrings that mark the Expense section.
    pub expense_markers: Vec<String>,
    /// Case-sensitive substrings that mark a subtotal row.
    pub subtotal_markers: Vec<String>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            income_markers: vec!["income".into(), "tulo".into()],
            expense_markers: vec!["expense".into(), "meno".into()],
            subtotal_markers: vec!["Total".into(), "Yhteensä".into()],
        }
    }
}

impl Layout {
    pub(crate) fn is_income_marker(&self, text: &str) -> bool {
        contains_any_ignore_case(text, &self.income_markers)
    }

    pub(crate) fn is_expense_marker(&self, text: &str) -> bool {
        contains_any_ignore_case(text, &self.expense_markers)
    }

    pub(crate) fn is_subtotal(&self, label: &str) -> bool {
        self.subtotal_markers
            .iter()
            .any(|m| !m.is_empty() && label.contains(m.as_str()))
    }
}

fn contains_any_ignore_case(text: &str, needles: &[String]) -> bool {
    let text = text.to_lowercase();
    needles
        .iter()
        .any(|n| !n.is_empty() && text.contains(&n.to_lowercase()))
}

/// True when a label or header carries no usable text.
pub(crate) fn is_blank(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text.eq_ignore_ascii_case(NAN_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_ignore_case() {
        let layout = Layout::default();
        assert!(layout.is_income_marker("INCOME"));
        assert!(layout.is_income_marker("Monthly income"));
        assert!(layout.is_income_marker("Tulot"));
        assert!(layout.is_expense_marker("Expenses"));
        assert!(layout.is_expense_marker("MENOT"));
        assert!(!layout.is_expense_marker("Rent"));
    }

    #[test]
    fn test_subtotal_is_case_sensitive() {
        let layout = Layout::default();
        assert!(layout.is_subtotal("Total Expenses"));
        assert!(layout.is_subtotal("Menot Yhteensä"));
        assert!(!layout.is_subtotal("total"));
        assert!(!layout.is_subtotal("Rent"));
    }

    #[test]
    fn test_empty_marker_words_never_match() {
        let layout = Layout {
            income_markers: vec![String::new()],
            expense_markers: vec![],
            subtotal_markers: vec![String::new()],
        };
        assert!(!layout.is_income_marker("anything"));
        assert!(!layout.is_subtotal("anything"));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("  "));
        assert!(is_blank("nan"));
        assert!(is_blank("NaN"));
        assert!(!is_blank("nanny"));
    }

    #[test]
    fn test_layout_partial_json_uses_defaults() {
        let layout: Layout = serde_json::from_str(r#"{"income_markers": ["revenue"]}"#).unwrap();
        assert_eq!(layout.income_markers, vec!["revenue".to_string()]);
        assert_eq!(layout.expense_markers, Layout::default().expense_markers);
    }
}
