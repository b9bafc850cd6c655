//! Amount type for handling monetary values typed into spreadsheets by hand.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that
//! may include currency symbols, thousands separators or a decimal comma.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::str::FromStr;

/// Characters that are stripped from a value before parsing.
const CURRENCY_SYMBOLS: &[char] = &['€', '$', '£'];

/// Characters used as thousands separators in addition to `,` and `.`.
const GROUPING_CHARS: &[char] = &[' ', '\u{a0}', '\u{202f}', '\''];

/// Represents a monetary value.
///
/// Parsing is lenient about the way people type numbers into a budget sheet:
///
/// ```
/// # use finsheet::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("1 234,50 €").unwrap();
/// let b = Amount::from_str("$1,234.50").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "1,234.50");
/// ```
///
/// A single comma followed by exactly three digits is read as a thousands separator:
///
/// ```
/// # use finsheet::model::Amount;
/// # use std::str::FromStr;
/// assert_eq!(Amount::from_str("1,000").unwrap(), Amount::from_str("1000").unwrap());
/// assert_eq!(Amount::from_str("12,5").unwrap(), Amount::from_str("12.5").unwrap());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Converts a spreadsheet float. Returns `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Decimal::from_f64(value).map(Self)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Rounds to whole currency units, half away from zero.
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Adds `other`, clamping at the bounds of `Decimal` instead of overflowing.
    pub fn saturating_add(self, other: Amount) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts `other`, clamping at the bounds of `Decimal` instead of overflowing.
    pub fn saturating_sub(self, other: Amount) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Formats the amount rounded to whole units with thousands separators, e.g. `-1,235`.
    pub fn whole(&self) -> String {
        format_grouped(self.rounded().0, ",.0")
    }
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError {
    input: String,
    source: rust_decimal::Error,
}

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "AmountError({:?}, {:?})", self.input, self.source)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not an amount: {}", self.input, self.source)
    }
}

impl Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        let value = Decimal::from_str(&normalized).map_err(|source| AmountError {
            input: s.to_string(),
            source,
        })?;
        Ok(Amount(value))
    }
}

/// Reduces a human-typed number to the plain `-1234.56` form that `Decimal` understands.
fn normalize(s: &str) -> String {
    let stripped: String = s
        .trim()
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && !GROUPING_CHARS.contains(c))
        .collect();

    // A trailing minus is common in exported accounting sheets, e.g. "120-".
    let stripped = match stripped.strip_suffix('-') {
        Some(rest) if !rest.starts_with('-') => format!("-{rest}"),
        _ => stripped,
    };

    let last_comma = stripped.rfind(',');
    let last_dot = stripped.rfind('.');
    match (last_comma, last_dot) {
        // Both present: whichever comes last is the decimal separator.
        (Some(c), Some(d)) if c > d => stripped.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => stripped.replace(',', ""),
        (Some(c), None) => {
            let single = stripped.matches(',').count() == 1;
            let digits_after = stripped.len() - c - 1;
            if single && digits_after != 3 {
                stripped.replace(',', ".")
            } else {
                stripped.replace(',', "")
            }
        }
        (None, Some(_)) if stripped.matches('.').count() > 1 => stripped.replace('.', ""),
        _ => stripped,
    }
}

fn format_grouped(value: Decimal, spec: &str) -> String {
    let num = value.to_f64().unwrap_or_default();
    match spec {
        ",.0" => format_num::format_num!(",.0", num),
        _ => format_num::format_num!(",.2", num),
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // format_num does not keep the sign of a zero that rounds away, so handle it ourselves.
        let (sign, num) = if self.is_negative() {
            ("-", self.0.abs())
        } else {
            ("", self.0)
        };
        write!(f, "{sign}{}", format_grouped(num, ",.2"))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Serialize the plain decimal, not the grouped display form.
        serializer.serialize_str(&self.0.normalize().to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::default(), Amount::saturating_add)
    }
}
