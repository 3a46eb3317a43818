use anyhow::{ensure, Result};
use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::data::builder::TokenizedCorpus;

/// One training example: `[MASK] body [CLS]` ids and its one-hot label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationSample {
    pub input_ids: Vec<u32>,
    pub label:     Vec<u8>,
}

pub struct ClassificationDataset {
    samples: Vec<ClassificationSample>,
}

impl ClassificationDataset {
    /// Zip the two parallel artifact sequences back into samples.
    ///
    /// The artifacts carry no linkage key besides position, so the
    /// shapes are checked here before anything reaches the model.
    pub fn from_corpus(corpus: TokenizedCorpus, num_labels: usize) -> Result<Self> {
        ensure!(
            corpus.sequences.len() == corpus.labels.len(),
            "tokenized data has {} sequences but {} labels",
            corpus.sequences.len(),
            corpus.labels.len()
        );

        let seq_len = corpus.sequences.first().map(Vec::len).unwrap_or(0);
        ensure!(
            corpus.sequences.is_empty() || seq_len > 0,
            "tokenized sequences are empty"
        );
        for (i, (seq, label)) in corpus.sequences.iter().zip(&corpus.labels).enumerate() {
            ensure!(
                seq.len() == seq_len,
                "sequence #{i} has length {}, expected {seq_len}",
                seq.len()
            );
            ensure!(
                label.len() == num_labels,
                "label #{i} has {} entries, expected {num_labels}",
                label.len()
            );
        }

        let samples = corpus
            .sequences
            .into_iter()
            .zip(corpus.labels)
            .map(|(input_ids, label)| ClassificationSample { input_ids, label })
            .collect();
        Ok(Self { samples })
    }

    /// Drop trailing samples that would only form a partial batch.
    pub fn truncate_to_full_batches(&mut self, batch_size: usize) {
        if batch_size > 0 {
            let keep = self.samples.len() - self.samples.len() % batch_size;
            self.samples.truncate(keep);
        }
    }

    pub fn seq_len(&self) -> Option<usize> {
        self.samples.first().map(|s| s.input_ids.len())
    }

    /// Largest token id in any sample; checked against the embedding size.
    pub fn max_token_id(&self) -> Option<u32> {
        self.samples.iter().flat_map(|s| s.input_ids.iter().copied()).max()
    }
}

impl Dataset<ClassificationSample> for ClassificationDataset {
    fn get(&self, index: usize) -> Option<ClassificationSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
