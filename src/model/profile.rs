use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// The household the person lives in.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Household {
    #[default]
    Single,
    Couple,
    Family,
    SingleParent,
}

serde_plain::derive_display_from_serialize!(Household);
serde_plain::derive_fromstr_from_deserialize!(Household);

/// Whether the sheet holds a budget plan or realised figures.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    #[default]
    Plan,
    Actual,
}

serde_plain::derive_display_from_serialize!(DataKind);
serde_plain::derive_fromstr_from_deserialize!(DataKind);

/// What the user tells us about themselves before asking for advice. Nothing in here identifies
/// the person.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub age: u8,
    pub household: Household,
    pub children: u8,
    pub goal: String,
    /// Homes plus investments minus debts.
    pub net_worth: Amount,
}
