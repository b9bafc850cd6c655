//! Compound-interest projection of a savings balance with fixed monthly contributions.

use crate::model::Amount;
use crate::Result;
use anyhow::ensure;
use rust_decimal::Decimal;
use serde::Serialize;

const MONTHS_PER_YEAR: u32 = 12;

/// Longest horizon accepted by `ProjectionInput::new`.
pub const MAX_YEARS: u32 = 100;

/// Highest annual rate accepted by `ProjectionInput::new`, in percent.
pub const MAX_RATE_PERCENT: u32 = 100;

/// Validated inputs of a projection.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct ProjectionInput {
    starting_balance: Amount,
    monthly_contribution: Amount,
    annual_rate_percent: Decimal,
    years: u32,
}

impl ProjectionInput {
    /// Validates the inputs.
    ///
    /// `monthly_contribution` may be zero or negative (a net withdrawal). Everything else must be
    /// non-negative, and `years` must be between 1 and `MAX_YEARS`.
    pub fn new(
        starting_balance: Amount,
        monthly_contribution: Amount,
        annual_rate_percent: Decimal,
        years: u32,
    ) -> Result<Self> {
        ensure!(
            !starting_balance.is_negative(),
            "The starting balance must not be negative, got {starting_balance}"
        );
        ensure!(
            !annual_rate_percent.is_sign_negative() || annual_rate_percent.is_zero(),
            "The annual interest rate must not be negative, got {annual_rate_percent}%"
        );
        ensure!(
            annual_rate_percent <= Decimal::from(MAX_RATE_PERCENT),
            "The annual interest rate must be at most {MAX_RATE_PERCENT}%, got {annual_rate_percent}%"
        );
        ensure!(
            (1..=MAX_YEARS).contains(&years),
            "The projection horizon must be between 1 and {MAX_YEARS} years, got {years}"
        );
        Ok(Self {
            starting_balance,
            monthly_contribution,
            annual_rate_percent,
            years,
        })
    }

    pub fn starting_balance(&self) -> Amount {
        self.starting_balance
    }

    pub fn monthly_contribution(&self) -> Amount {
        self.monthly_contribution
    }

    pub fn annual_rate_percent(&self) -> Decimal {
        self.annual_rate_percent
    }

    pub fn years(&self) -> u32 {
        self.years
    }
}

/// The state of the balance at the end of a year, rounded to whole currency units.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct YearSnapshot {
    pub year: u32,
    pub principal_contributed: Amount,
    pub growth: Amount,
    pub total_balance: Amount,
}

/// One snapshot per year, starting with year 0.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct ProjectionSeries {
    pub input: ProjectionInput,
    pub snapshots: Vec<YearSnapshot>,
}

impl ProjectionSeries {
    pub fn final_snapshot(&self) -> Option<&YearSnapshot> {
        self.snapshots.last()
    }
}

/// Simulates monthly compounding: each month the contribution is added first, then interest of
/// `rate / 100 / 12` is applied to the whole balance.
///
/// Accumulation uses unrounded values; only the emitted snapshots are rounded. Arithmetic
/// saturates at the limits of `Decimal` instead of overflowing.
pub fn project(input: &ProjectionInput) -> ProjectionSeries {
    let monthly_factor = Decimal::ONE
        + input.annual_rate_percent / Decimal::ONE_HUNDRED / Decimal::from(MONTHS_PER_YEAR);
    let contribution = input.monthly_contribution.value();

    let mut balance = input.starting_balance.value();
    let mut principal = input.starting_balance.value();
    let mut snapshots = Vec::with_capacity(input.years as usize + 1);
    snapshots.push(snapshot(0, principal, balance));

    for year in 1..=input.years {
        for _ in 0..MONTHS_PER_YEAR {
            balance = balance.saturating_add(contribution);
            principal = principal.saturating_add(contribution);
            balance = balance.saturating_mul(monthly_factor);
        }
        snapshots.push(snapshot(year, principal, balance));
    }

    ProjectionSeries {
        input: *input,
        snapshots,
    }
}

fn snapshot(year: u32, principal: Decimal, balance: Decimal) -> YearSnapshot {
    YearSnapshot {
        year,
        principal_contributed: Amount::new(principal).rounded(),
        growth: Amount::new(balance.saturating_sub(principal)).rounded(),
        total_balance: Amount::new(balance).rounded(),
    }
}
