//! Derives averages, totals and the net balance from a `RecordStore`.
//!
//! # Averaging policy
//!
//! A label's average is the sum of its amounts divided by the number of distinct periods that
//! appear anywhere in the store, not by the number of periods the label itself appears in. A
//! 1,200 insurance premium paid once in a twelve-month sheet therefore averages to 100 per month.
//! Sparse labels are amortized over the whole observed horizon.

use crate::model::{Amount, Category, RecordStore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Case-insensitive substring matcher for labels, e.g. the list of words that identify
/// investment-like expense rows.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet(Vec<String>);

impl KeywordSet {
    pub fn new<S, I>(keywords: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = S>,
    {
        Self(
            keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .filter(|k| !k.trim().is_empty())
                .collect(),
        )
    }

    /// The words used by the default configuration.
    pub fn default_investment() -> Self {
        Self::new([
            "sijoitus",
            "rahasto",
            "osake",
            "säästö",
            "nordnet",
            "op-tuotto",
            "etf",
            "investment",
            "fund",
            "stock",
            "savings",
        ])
    }

    pub fn matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.0.iter().any(|k| label.contains(&k.to_lowercase()))
    }

    pub fn keywords(&self) -> &[String] {
        &self.0
    }
}

/// Caller-supplied settings for `aggregate`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AggregateOptions {
    /// How many expenses to keep in `top_expenses`.
    pub top_n: usize,
    /// Expense labels matching these words count towards `investment_total`.
    pub investment_keywords: KeywordSet,
    /// True savings above this amount make the household `Strong`.
    pub strong_savings_threshold: Amount,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            investment_keywords: KeywordSet::default_investment(),
            strong_savings_threshold: Amount::new(Decimal::from(500)),
        }
    }
}

/// The per-period average of one label.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct LabelAverage {
    pub category: Category,
    pub label: String,
    pub average: Amount,
}

/// A coarse reading of the household's monthly balance.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsStatus {
    /// Expenses exceed income.
    Deficit,
    /// Income covers expenses with little left over.
    Balanced,
    /// True savings exceed the configured threshold.
    Strong,
}

serde_plain::derive_display_from_serialize!(SavingsStatus);

/// Everything derived from a `RecordStore`. Always rebuilt, never updated.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AggregateView {
    /// The number of distinct periods that carry at least one record. This is the averaging
    /// denominator, and it can be smaller than `RecordStore::periods().len()` when a header
    /// column has no values at all.
    pub period_count: usize,
    /// Every label's average, income first, then in the order labels first appeared.
    pub averages: Vec<LabelAverage>,
    pub income_total: Amount,
    pub expense_total: Amount,
    /// `income_total - expense_total`.
    pub net_balance: Amount,
    /// Expense averages sorted descending, truncated to `top_n`.
    pub top_expenses: Vec<LabelAverage>,
    /// Sum of the expense averages whose label matches an investment keyword.
    pub investment_total: Amount,
    /// `net_balance + investment_total`: what is really put aside each period.
    pub true_savings: Amount,
    pub status: SavingsStatus,
}

impl AggregateView {
    pub fn averages_in(&self, category: Category) -> impl Iterator<Item = &LabelAverage> {
        self.averages.iter().filter(move |a| a.category == category)
    }

    /// `amount` as a percentage of the income total, or `None` when there is no income or the
    /// share is too large to represent.
    pub fn share_of_income(&self, amount: Amount) -> Option<Decimal> {
        if self.income_total.is_zero() {
            return None;
        }
        amount
            .value()
            .checked_div(self.income_total.value())?
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|share| share.round_dp(1))
    }
}

/// Builds the `AggregateView` of `store`.
pub fn aggregate(store: &RecordStore, options: &AggregateOptions) -> AggregateView {
    let periods: BTreeSet<&str> = store.records().iter().map(|r| r.period.as_str()).collect();
    let period_count = periods.len();

    // Sum per (category, label), remembering first appearance so output order is stable.
    let mut order: Vec<(Category, &str)> = Vec::new();
    let mut sums: BTreeMap<(Category, &str), Decimal> = BTreeMap::new();
    for record in store.records() {
        let key = (record.category, record.label.as_str());
        let sum = sums.entry(key).or_insert_with(|| {
            order.push(key);
            Decimal::ZERO
        });
        *sum = sum.saturating_add(record.amount.value());
    }
    order.sort_by_key(|(category, _)| *category);

    let averages: Vec<LabelAverage> = order
        .iter()
        .map(|key| {
            let sum = sums.get(key).copied().unwrap_or_default();
            LabelAverage {
                category: key.0,
                label: key.1.to_string(),
                average: Amount::new(sum / Decimal::from(period_count)),
            }
        })
        .collect();

    let total = |category: Category| -> Amount {
        averages
            .iter()
            .filter(|a| a.category == category)
            .map(|a| a.average)
            .sum()
    };
    let income_total = total(Category::Income);
    let expense_total = total(Category::Expense);
    let net_balance = income_total.saturating_sub(expense_total);

    let mut top_expenses: Vec<LabelAverage> = averages
        .iter()
        .filter(|a| a.category == Category::Expense)
        .cloned()
        .collect();
    // Stable sort keeps sheet order among equal averages.
    top_expenses.sort_by(|a, b| b.average.cmp(&a.average));
    top_expenses.truncate(options.top_n);

    let investment_total: Amount = averages
        .iter()
        .filter(|a| a.category == Category::Expense)
        .filter(|a| options.investment_keywords.matches(&a.label))
        .map(|a| a.average)
        .sum();
    let true_savings = net_balance.saturating_add(investment_total);

    let status = if net_balance.is_negative() {
        SavingsStatus::Deficit
    } else if true_savings > options.strong_savings_threshold {
        SavingsStatus::Strong
    } else {
        SavingsStatus::Balanced
    };

    AggregateView {
        period_count,
        averages,
        income_total,
        expense_total,
        net_balance,
        top_expenses,
        investment_total,
        true_savings,
        status,
    }
}
