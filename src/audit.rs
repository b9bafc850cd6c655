//! Appends one anonymised row per completed analysis to a CSV file.

use crate::model::{Amount, DataKind, Household, Profile};
use crate::Result;
use anyhow::{anyhow, Context};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

/// A row of the audit log. Rows never contain the goal or the net worth.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub age: u8,
    pub household: Household,
    pub children: u8,
    pub data_kind: DataKind,
    pub net_balance: Amount,
}

impl AuditEntry {
    /// Creates an entry with a fresh id and the current time.
    pub fn new(profile: &Profile, data_kind: DataKind, net_balance: Amount) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            age: profile.age,
            household: profile.household,
            children: profile.children,
            data_kind,
            net_balance,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `entry`, writing the header row first when the file is missing or empty.
    pub async fn append(&self, entry: &AuditEntry) -> Result<()> {
        let is_new = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata.len() == 0,
            Err(_) => true,
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(Vec::new());
        writer
            .serialize(entry)
            .context("Unable to serialize the audit entry")?;
        let row = writer
            .into_inner()
            .map_err(|e| anyhow!("Unable to flush the audit entry: {e}"))?;

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Unable to open the audit log at {}", self.path.display()))?;
        file.write_all(&row)
            .await
            .with_context(|| format!("Unable to write the audit log at {}", self.path.display()))?;
        file.flush().await.context("Unable to flush the audit log")?;
        debug!("Appended audit entry {} to {}", entry.id, self.path.display());
        Ok(())
    }

    /// Reads every entry back.
    pub async fn entries(&self) -> Result<Vec<AuditEntry>> {
        let data = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Unable to read the audit log at {}", self.path.display()))?;
        let mut rdr = csv::Reader::from_reader(data.as_slice());
        let mut entries = Vec::new();
        for result in rdr.deserialize::<AuditEntry>() {
            entries.push(result.context("Unable to parse an audit log row")?);
        }
        Ok(entries)
    }
}
