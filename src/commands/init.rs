use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its secrets subdirectory and:
/// - Creates an initial `config.json` file with default settings
/// - Copies `api_key_file`, if given, into its default location in the data dir.
///
/// # Arguments
/// - `finsheet_home` - The directory that will be the root of data directory, e.g.
///   `$HOME/finsheet`
/// - `api_key_file` - A text file holding a Gemini API key.
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(finsheet_home: &Path, api_key_file: Option<&Path>) -> Result<Out<()>> {
    let config = Config::create(finsheet_home, api_key_file)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    let key_note = match api_key_file {
        Some(_) => "with your API key".to_string(),
        None => format!(
            "without an API key, set {} or rerun init with --api-key before using advise",
            crate::config::API_KEY_ENV_VAR
        ),
    };
    Ok(format!(
        "Successfully created the finsheet directory at {} {key_note}",
        config.root().display()
    )
    .into())
}
