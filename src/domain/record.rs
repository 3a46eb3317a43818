// ============================================================
// Layer 3: Raw Record Domain Type
// ============================================================
// One labeled example as it appears in the raw training file:
//
//   [
//     {"label": 1, "sentence": "..."},
//     {"label": 0, "sentence": "..."}
//   ]
//
// The label is a class index; training needs it as a one-hot
// vector with one slot per class.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// A single labeled sentence from the raw JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Index of the true class, in `0..num_labels`
    pub label: usize,

    /// The text to classify
    pub sentence: String,
}

impl RawRecord {
    #[cfg(test)]
    pub fn new(label: usize, sentence: impl Into<String>) -> Self {
        Self { label, sentence: sentence.into() }
    }

    /// Encode the label as a one-hot vector of `num_labels` entries.
    pub fn one_hot(&self, num_labels: usize) -> Result<Vec<u8>> {
        one_hot(self.label, num_labels)
    }
}

/// Build a vector of `num_labels` zeros with a single 1 at `label`.
pub fn one_hot(label: usize, num_labels: usize) -> Result<Vec<u8>> {
    ensure!(
        label < num_labels,
        "label {label} is out of range for {num_labels} classes"
    );
    let mut v = vec![0u8; num_labels];
    v[label] = 1;
    Ok(v)
}
