//! Types that represent the core data model, such as `RawGrid` and `RecordStore`.
mod amount;
mod grid;
mod profile;
mod record;
mod row_col;

pub use amount::{Amount, AmountError};
pub use grid::{Cell, RawGrid};
pub use profile::{DataKind, Household, Profile};
pub use record::{Category, LineItemRecord, RecordStore};
pub use row_col::RowCol;
