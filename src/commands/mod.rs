//! Command handlers for the finsheet CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod advise;
mod analyze;
mod init;
mod project;

use crate::error::{ErrorType, IntoResult};
use crate::model::RecordStore;
use crate::session::Session;
use crate::{api, parse, utils, Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

pub use advise::{advise, AdviseOutput};
pub use analyze::{analyze, AnalyzeOutput};
pub use init::init;
pub use project::{project, ProjectOutput};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data to the command line.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to stdout.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            match serde_json::to_string_pretty(structure) {
                Ok(json) => println!("{json}"),
                Err(e) => debug!("Unable to serialize the command output: {e}"),
            }
        }
    }
}

/// Reads `file` and parses it through `session`. A sheet without the expected structure is an
/// `ErrorType::Structure` error.
async fn load_store(
    config: &Config,
    session: &mut Session,
    file: &Path,
    sheet: Option<&str>,
) -> Result<RecordStore> {
    let bytes = utils::read_bytes(file).await.pub_result(ErrorType::Io)?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.to_string_lossy().to_string());

    let layout = config.layout();
    let outcome = session
        .load(&name, &bytes, |bytes| {
            let grid = api::load_grid(bytes, &name, sheet)?;
            Ok(parse::parse_grid(&grid, layout))
        })
        .with_context(|| format!("Unable to read the spreadsheet '{}'", file.display()))
        .pub_result(ErrorType::Io)?;

    match outcome.as_ref() {
        Ok(store) => Ok(store.clone()),
        Err(e) => Err::<RecordStore, _>(anyhow::Error::new(*e))
            .with_context(|| {
                format!(
                    "Unable to analyze '{}', check that column B holds an Income marker followed \
                    by an Expense marker",
                    file.display()
                )
            })
            .pub_result(ErrorType::Structure),
    }
}
