//! Configuration file handling for finsheet.
//!
//! The configuration file is stored at `$FINSHEET_HOME/config.json` and contains the analysis
//! settings (how many expenses to highlight, which labels count as investments, the sheet
//! layout), the Gemini settings and the location of the API key and the audit log.

use crate::aggregate::{AggregateOptions, KeywordSet};
use crate::model::Amount;
use crate::parse::Layout;
use crate::{utils, Result};
use anyhow::{bail, Context};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const APP_NAME: &str = "finsheet";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CONFIG_JSON: &str = "config.json";
const GEMINI_API_KEY: &str = "gemini_api_key";
const AUDIT_LOG_CSV: &str = "analysis_log.csv";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TOP_N: usize = 5;
const DEFAULT_STRONG_SAVINGS: i64 = 500;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Consulted when no key file exists in the secrets directory.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$FINSHEET_HOME` and from there it loads `$FINSHEET_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the finsheet home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its secrets subdirectory and:
    /// - Creates an initial `config.json` file with default settings
    /// - Copies `api_key_file`, if given, into its default location in the data dir.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/finsheet`
    /// - `api_key_file` - A text file holding a Gemini API key. Without it the key has to come
    ///   from the `GEMINI_API_KEY` environment variable.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, api_key_file: Option<&Path>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the finsheet home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let secrets_dir = root.join(SECRETS);
        utils::make_dir(&secrets_dir).await?;

        if let Some(api_key_file) = api_key_file {
            utils::copy(api_key_file, secrets_dir.join(GEMINI_API_KEY))
                .await
                .context("Unable to copy the API key into the secrets directory")?;
        }

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets: secrets_dir,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that `finsheet_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the secrets directory exists
    /// - return the loaded configuration object
    pub async fn load(finsheet_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = finsheet_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Finsheet Home is missing, run `finsheet init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let config = Self {
            secrets: root.join(SECRETS),
            root,
            config_path,
            config_file,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn layout(&self) -> &Layout {
        &self.config_file.layout
    }

    pub fn model(&self) -> &str {
        &self.config_file.model
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.request_timeout_secs)
    }

    /// The settings for `aggregate`, with `top_n` replaced when the caller gives one.
    pub fn aggregate_options(&self, top_n: Option<usize>) -> AggregateOptions {
        AggregateOptions {
            top_n: top_n.unwrap_or(self.config_file.top_n),
            investment_keywords: self.config_file.investment_keywords.clone(),
            strong_savings_threshold: self.config_file.strong_savings_threshold,
        }
    }

    /// Returns the stored `api_key_path` if it is absolute, otherwise resolves the relative path.
    pub fn api_key_path(&self) -> PathBuf {
        self.resolve_path(self.config_file.api_key_path())
    }

    /// Returns the stored `audit_log_path` if it is absolute, otherwise resolves the relative path.
    pub fn audit_log_path(&self) -> PathBuf {
        self.resolve_path(self.config_file.audit_log_path())
    }

    /// Reads the Gemini API key from `api_key_path`, falling back to `GEMINI_API_KEY`.
    pub async fn api_key(&self) -> Result<String> {
        let path = self.api_key_path();
        if path.is_file() {
            let key = utils::read(&path).await?.trim().to_string();
            if key.is_empty() {
                bail!("The API key file is empty '{}'", path.display());
            }
            debug!("Using the API key from {}", path.display());
            return Ok(key);
        }
        match std::env::var(API_KEY_ENV_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => bail!(
                "No Gemini API key found, expected the file '{}' or the {API_KEY_ENV_VAR} \
                environment variable",
                path.display()
            ),
        }
    }

    /// Checks if `p` is relative, and if so, resolves it against the home directory.
    fn resolve_path(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "finsheet",
///   "config_version": 1,
///   "top_n": 5,
///   "investment_keywords": ["sijoitus", "rahasto", "etf"],
///   "strong_savings_threshold": "500",
///   "layout": {
///     "income_markers": ["income", "tulo"],
///     "expense_markers": ["expense", "meno"],
///     "subtotal_markers": ["Total", "Yhteensä"]
///   },
///   "model": "gemini-2.5-flash",
///   "request_timeout_secs": 60,
///   "api_key_path": ".secrets/gemini_api_key",
///   "audit_log_path": "analysis_log.csv"
/// }
/// ```
///
/// Everything except `app_name` and `config_version` may be omitted.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "finsheet"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of expenses listed as the largest
    #[serde(default = "default_top_n")]
    top_n: usize,

    /// Expense labels containing one of these words count as investments
    #[serde(default = "KeywordSet::default_investment")]
    investment_keywords: KeywordSet,

    /// True savings above this make the household's status strong
    #[serde(default = "default_strong_savings")]
    strong_savings_threshold: Amount,

    /// How the budget template is recognized
    #[serde(default)]
    layout: Layout,

    /// Gemini model name
    #[serde(default = "default_model")]
    model: String,

    /// Timeout for one narrative request
    #[serde(default = "default_timeout_secs")]
    request_timeout_secs: u64,

    /// Path to the Gemini API key (optional, relative to config.json or absolute)
    /// Defaults to $FINSHEET_HOME/.secrets/gemini_api_key if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key_path: Option<PathBuf>,

    /// Path to the audit log (optional, relative to config.json or absolute)
    /// Defaults to $FINSHEET_HOME/analysis_log.csv if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    audit_log_path: Option<PathBuf>,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_strong_savings() -> Amount {
    Amount::new(Decimal::from(DEFAULT_STRONG_SAVINGS))
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            top_n: DEFAULT_TOP_N,
            investment_keywords: KeywordSet::default_investment(),
            strong_savings_threshold: default_strong_savings(),
            layout: Layout::default(),
            model: default_model(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key_path: None,
            audit_log_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.request_timeout_secs > 0,
            "Invalid request_timeout_secs in config file: must be greater than zero"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn api_key_path(&self) -> PathBuf {
        self.api_key_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(GEMINI_API_KEY))
    }

    fn audit_log_path(&self) -> PathBuf {
        self.audit_log_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(AUDIT_LOG_CSV))
    }
}
