//! Everything finsheet exchanges with the outside world: uploaded spreadsheets come in through
//! `load_grid`, and narratives come back from a `Narrator`.

mod csv_grid;
mod gemini;
mod narrator;
mod test_narrator;
mod workbook;

pub(crate) use csv_grid::grid_from_csv_bytes;
pub use narrator::Narrator;
pub use test_narrator::{TestNarrator, TEST_NARRATIVE};

use crate::model::RawGrid;
use crate::{Config, Result};
use anyhow::bail;
use gemini::GeminiNarrator;
use std::path::Path;
use tracing::debug;
use workbook::grid_from_workbook_bytes;

/// When this environment variable is set and non-empty, the program never talks to Gemini.
pub const TEST_MODE_VAR: &str = "FINSHEET_IN_TEST_MODE";

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Which `Narrator` implementation to use.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Gemini,
    Testing,
}

impl Mode {
    /// `Mode::Testing` when `FINSHEET_IN_TEST_MODE` is set and non-empty, otherwise
    /// `Mode::Gemini`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_VAR) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Gemini,
        }
    }
}

/// Constructs the `Narrator` for `mode`. The Gemini API key is only required in `Mode::Gemini`.
pub async fn narrator(config: &Config, mode: Mode) -> Result<Box<dyn Narrator>> {
    match mode {
        Mode::Testing => {
            debug!("Using the test narrator");
            Ok(Box::new(TestNarrator::new()))
        }
        Mode::Gemini => {
            let api_key = config.api_key().await?;
            Ok(Box::new(GeminiNarrator::new(
                api_key,
                config.model().to_string(),
                config.request_timeout(),
            )?))
        }
    }
}

/// Reads an uploaded spreadsheet. The format is chosen by the extension of `file_name`; `sheet`
/// selects a worksheet in workbook formats and is ignored for CSV.
pub fn load_grid(bytes: &[u8], file_name: &str, sheet: Option<&str>) -> Result<RawGrid> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if extension == "csv" {
        debug!("Reading '{file_name}' as CSV");
        return grid_from_csv_bytes(bytes);
    }
    if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        debug!("Reading '{file_name}' as a workbook");
        return grid_from_workbook_bytes(bytes, sheet);
    }
    bail!(
        "Unsupported file type '{file_name}', expected .csv or one of: {}",
        WORKBOOK_EXTENSIONS
            .iter()
            .map(|e| format!(".{e}"))
            .collect::<Vec<_>>()
            .join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{TestEnv, SCENARIO_SHEET};

    #[test]
    fn test_load_grid_dispatches_on_extension() {
        let grid = load_grid(SCENARIO_SHEET.as_bytes(), "Budget.CSV", None).unwrap();
        assert_eq!(grid.height(), 10);
        assert!(load_grid(SCENARIO_SHEET.as_bytes(), "budget.xlsx", None).is_err());
        assert!(load_grid(b"", "budget.txt", None).is_err());
        assert!(load_grid(b"", "budget", None).is_err());
    }

    #[tokio::test]
    async fn test_testing_mode_needs_no_key() {
        let env = TestEnv::new().await;
        let narrator = narrator(&env.config(), Mode::Testing).await.unwrap();
        assert_eq!(narrator.generate("payload").await.unwrap(), TEST_NARRATIVE);
    }
}
