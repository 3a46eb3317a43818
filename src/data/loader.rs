// ============================================================
// Layer 4: Raw Record Loader
// ============================================================
// Reads the raw training file: a single JSON array of
// {label, sentence} objects.
//
// Unlike a directory of loose documents, the raw file is one
// unit. A missing file or a malformed entry aborts the whole
// load; there is nothing sensible to skip to.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::record::RawRecord;
use crate::domain::traits::RecordSource;

/// Loads labeled records from a JSON array file.
/// Implements the RecordSource trait from Layer 3.
pub struct JsonRecordLoader {
    path: PathBuf,
}

impl JsonRecordLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordSource for JsonRecordLoader {
    fn load_all(&self) -> Result<Vec<RawRecord>> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read raw data '{}'", self.path.display()))?;

        let records: Vec<RawRecord> = serde_json::from_str(&text)
            .with_context(|| format!("Malformed raw data in '{}'", self.path.display()))?;

        tracing::info!(
            "Loaded {} raw records from '{}'",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}
