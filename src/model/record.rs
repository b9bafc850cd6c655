use crate::model::{Amount, RowCol};
use serde::{Deserialize, Serialize};

/// Which section of the sheet a line item came from.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

/// One positive amount for one labeled row in one period.
///
/// Identity is `(category, label, period)`, and it is not unique: a sheet that repeats a label
/// produces several records with the same identity which consumers must sum.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LineItemRecord {
    pub category: Category,
    pub label: String,
    pub period: String,
    /// Always strictly positive.
    pub amount: Amount,
    /// Where the amount was read from.
    pub cell: RowCol,
}

/// The extracted records of one uploaded file, along with the period headers that were accepted
/// for extraction in column order.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecordStore {
    periods: Vec<String>,
    records: Vec<LineItemRecord>,
}

impl RecordStore {
    pub fn new(periods: Vec<String>, records: Vec<LineItemRecord>) -> Self {
        Self { periods, records }
    }

    /// The distinct, non-empty period headers of the sheet in column order. A header whose column
    /// holds no values is still listed here.
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn records(&self) -> &[LineItemRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &LineItemRecord> {
        self.records.iter().filter(move |r| r.category == category)
    }

    /// Sums the amounts of `category` for every period, in header order. Periods with no records
    /// are reported as zero so that chart series line up.
    pub fn period_totals(&self, category: Category) -> Vec<(String, Amount)> {
        self.periods
            .iter()
            .map(|period| {
                let total: Amount = self
                    .by_category(category)
                    .filter(|r| &r.period == period)
                    .map(|r| r.amount)
                    .sum();
                (period.clone(), total)
            })
            .collect()
    }
}
