//! Error handling for the crate.
//!
//! Internally everything is an `anyhow::Error`. At the public boundary (the command handlers) an
//! `ErrorType` is attached as context so that the CLI can tell the user what kind of thing went
//! wrong without parsing messages.

use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of errors returned by the command handlers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The configuration or the home directory is missing or invalid.
    Config,
    /// A file could not be read or written.
    Io,
    /// The spreadsheet does not have the Income/Expense structure we can analyze.
    Structure,
    /// A user-supplied value is out of range.
    Input,
    /// The external text-generation service failed.
    Narrator,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// Attaches an `ErrorType` to the error of a `Result`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}

/// Finds the `ErrorType` attached with `pub_result`, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<ErrorType>().copied()
}
