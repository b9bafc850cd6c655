//! A `Narrator` that never leaves the process.

use crate::api::Narrator;
use crate::Result;
use anyhow::bail;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// The text returned by `TestNarrator::new`.
pub const TEST_NARRATIVE: &str = "## 1. Current situation\n\nThis is a canned analysis.";

/// Returns a canned answer, or fails on every call when built with `failing`. Counts how often it
/// was asked.
#[derive(Debug, Default)]
pub struct TestNarrator {
    response: Option<String>,
    calls: AtomicUsize,
}

impl TestNarrator {
    pub fn new() -> Self {
        Self::with_response(TEST_NARRATIVE)
    }

    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Narrator for TestNarrator {
    async fn generate(&self, payload: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!("Test narrator received {} bytes", payload.len());
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => bail!("The test narrator is configured to fail"),
        }
    }
}
