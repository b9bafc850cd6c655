//! Keeps the parse result of the most recently loaded file so that repeated work on the same
//! upload does not parse it again.

use crate::model::RecordStore;
use crate::parse::StructureError;
use crate::Result;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, trace};

/// What a parse produced: records, or the structural failure. Both are remembered.
pub type ParseOutcome = Arc<std::result::Result<RecordStore, StructureError>>;

/// Identifies an uploaded file by name, size and content.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FileIdentity {
    pub name: String,
    pub size: usize,
    /// Hex-encoded SHA-256 of the content.
    pub digest: String,
}

impl FileIdentity {
    pub fn new(name: impl Into<String>, bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self {
            name: name.into(),
            size: bytes.len(),
            digest: hex::encode(hasher.finalize()),
        }
    }
}

/// Holds at most one parsed file.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<(FileIdentity, ParseOutcome)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the outcome for `bytes`, calling `parse` only when the identity differs from the
    /// file loaded last. A different file replaces the remembered one. When `parse` itself
    /// fails (the bytes are not a readable spreadsheet), nothing is remembered.
    pub fn load<F>(&mut self, name: &str, bytes: &[u8], parse: F) -> Result<ParseOutcome>
    where
        F: FnOnce(&[u8]) -> Result<std::result::Result<RecordStore, StructureError>>,
    {
        let identity = FileIdentity::new(name, bytes);
        if let Some((current, outcome)) = &self.current {
            if *current == identity {
                trace!("Reusing the parse of '{name}'");
                return Ok(outcome.clone());
            }
        }

        self.current = None;
        debug!("Parsing '{name}' ({} bytes, {})", identity.size, identity.digest);
        let outcome: ParseOutcome = Arc::new(parse(bytes)?);
        self.current = Some((identity, outcome.clone()));
        Ok(outcome)
    }

    pub fn current(&self) -> Option<&FileIdentity> {
        self.current.as_ref().map(|(identity, _)| identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::load_grid;
    use crate::parse::{parse_grid, Layout};
    use crate::test::SCENARIO_SHEET;
    use anyhow::bail;
    use std::cell::Cell;

    fn counting_parse<'a>(
        calls: &'a Cell<usize>,
        name: &'a str,
    ) -> impl FnOnce(&[u8]) -> Result<std::result::Result<RecordStore, StructureError>> + 'a {
        move |bytes| {
            calls.set(calls.get() + 1);
            let grid = load_grid(bytes, name, None)?;
            Ok(parse_grid(&grid, &Layout::default()))
        }
    }

    #[test]
    fn test_identity() {
        let a = FileIdentity::new("a.csv", b"abc");
        assert_eq!(a.size, 3);
        assert_eq!(
            a.digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(a, FileIdentity::new("b.csv", b"abc"));
        assert_ne!(a, FileIdentity::new("a.csv", b"abd"));
    }

    #[test]
    fn test_same_file_is_parsed_once() {
        let calls = Cell::new(0);
        let mut session = Session::new();
        let first = session
            .load("b.csv", SCENARIO_SHEET.as_bytes(), counting_parse(&calls, "b.csv"))
            .unwrap();
        let second = session
            .load("b.csv", SCENARIO_SHEET.as_bytes(), counting_parse(&calls, "b.csv"))
            .unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.as_ref().as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_changed_content_is_parsed_again() {
        let calls = Cell::new(0);
        let mut session = Session::new();
        session
            .load("b.csv", SCENARIO_SHEET.as_bytes(), counting_parse(&calls, "b.csv"))
            .unwrap();
        let edited = SCENARIO_SHEET.replace("Rent,800,800", "Rent,900,900");
        let outcome = session
            .load("b.csv", edited.as_bytes(), counting_parse(&calls, "b.csv"))
            .unwrap();
        assert_eq!(calls.get(), 2);
        let store = outcome.as_ref().as_ref().unwrap();
        assert!(store.records().iter().any(|r| r.amount.whole() == "900"));
        assert_eq!(session.current().unwrap().size, edited.len());
    }

    #[test]
    fn test_structural_failure_is_remembered() {
        let calls = Cell::new(0);
        let mut session = Session::new();
        let bytes = b",Nothing here\n";
        for _ in 0..2 {
            let outcome = session
                .load("x.csv", bytes, counting_parse(&calls, "x.csv"))
                .unwrap();
            assert_eq!(*outcome, Err(StructureError::MissingIncomeMarker));
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_read_failures_are_not_remembered() {
        let mut session = Session::new();
        for _ in 0..2 {
            let result = session.load("x.csv", b"", |_| bail!("unreadable"));
            assert!(result.is_err());
        }
        assert!(session.current().is_none());
    }
}
