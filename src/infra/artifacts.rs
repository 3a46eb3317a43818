// ============================================================
// Layer 6: Artifact Store
// ============================================================
// Persists the builder output as two independent JSON files:
//
//   data/tokenized/
//     tokenized_data.json   ← [[id, id, ...], ...]
//     label.json            ← [[0, 1], [1, 0], ...]
//
// Entry i of one file belongs to entry i of the other. There is
// no key tying them together, so they are always written and
// read as a pair.

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::data::builder::TokenizedCorpus;

pub const TOKENIZED_FILE: &str = "tokenized_data.json";
pub const LABEL_FILE:     &str = "label.json";

pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn tokenized_path(&self) -> PathBuf {
        self.dir.join(TOKENIZED_FILE)
    }

    pub fn label_path(&self) -> PathBuf {
        self.dir.join(LABEL_FILE)
    }

    /// Write both artifacts, creating the directory if needed.
    pub fn save(&self, corpus: &TokenizedCorpus) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;

        write_json(&self.label_path(), &corpus.labels)?;
        write_json(&self.tokenized_path(), &corpus.sequences)?;

        tracing::info!(
            "Wrote {} examples to '{}' and '{}'",
            corpus.len(),
            self.tokenized_path().display(),
            self.label_path().display()
        );
        Ok(())
    }

    /// Read both artifacts back. Shape checks happen when the
    /// corpus is turned into a dataset.
    pub fn load(&self) -> Result<TokenizedCorpus> {
        let sequences: Vec<Vec<u32>> = read_json(&self.tokenized_path())?;
        let labels:    Vec<Vec<u8>>  = read_json(&self.label_path())?;
        tracing::info!("Loaded {} tokenized examples", sequences.len());
        Ok(TokenizedCorpus { sequences, labels })
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    fs::write(path, json).with_context(|| format!("Cannot write '{}'", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Malformed JSON in '{}'", path.display()))
}
