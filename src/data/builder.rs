// ============================================================
// Layer 4: Tokenized-Data Builder
// ============================================================
// Turns raw labeled records into the two parallel sequences the
// trainer consumes:
//
//   raw records
//       │  one-hot labels, newline → [SEP]
//       ▼
//   filter: keep sentences longer than min_length chars
//       │
//       ▼
//   pad with '0' / truncate to max_length - 2 chars
//       │
//       ▼
//   tokenize, fit to max_length - 2 ids
//       │
//       ▼
//   [MASK] + ids + [CLS]
//
// Filtering drops whole records, so sequences[i] and labels[i]
// always describe the same example.

use anyhow::{anyhow, ensure, Context, Result};

use crate::data::preprocessor::{Preprocessor, PAD_CHAR};
use crate::domain::record::RawRecord;
use crate::domain::traits::SequenceEncoder;

/// Sentinel placed before the sentence body.
pub const MASK_TOKEN: &str = "[MASK]";
/// Sentinel placed after the sentence body; the classifier reads
/// the hidden state at this position.
pub const CLS_TOKEN: &str = "[CLS]";
/// Fallback filler when the vocabulary has no "0" entry.
pub const PAD_TOKEN: &str = "[PAD]";

/// Output of the builder: position-aligned token sequences and
/// one-hot labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenizedCorpus {
    pub sequences: Vec<Vec<u32>>,
    pub labels:    Vec<Vec<u8>>,
}

impl TokenizedCorpus {
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

/// Builder settings.
#[derive(Debug, Clone)]
pub struct CorpusBuilder {
    min_length: usize,
    max_length: usize,
    num_labels: usize,
}

impl CorpusBuilder {
    pub fn new(min_length: usize, max_length: usize, num_labels: usize) -> Result<Self> {
        ensure!(max_length >= 3, "max_length must leave room for two sentinels and a body, got {max_length}");
        ensure!(num_labels > 0, "num_labels must be positive");
        Ok(Self { min_length, max_length, num_labels })
    }

    pub fn build<E: SequenceEncoder>(
        &self,
        records: &[RawRecord],
        encoder: &E,
    ) -> Result<TokenizedCorpus> {
        let mask_id = lookup(encoder, MASK_TOKEN)?;
        let cls_id  = lookup(encoder, CLS_TOKEN)?;
        let fill_id = encoder
            .token_id(&PAD_CHAR.to_string())
            .or_else(|| encoder.token_id(PAD_TOKEN))
            .ok_or_else(|| anyhow!("Vocabulary has neither '{PAD_CHAR}' nor '{PAD_TOKEN}'"))?;

        let prep = Preprocessor::new(self.max_length);
        let mut corpus = TokenizedCorpus::default();

        for (index, record) in records.iter().enumerate() {
            let label = record
                .one_hot(self.num_labels)
                .with_context(|| format!("Bad label in raw record #{index}"))?;

            let line = prep.mark_lines(&record.sentence);
            if line.chars().count() <= self.min_length {
                continue;
            }

            let mut ids = encoder
                .encode(&prep.fit(&line))
                .with_context(|| format!("Cannot tokenize raw record #{index}"))?;
            ids.resize(prep.body_len(), fill_id);

            let mut seq = Vec::with_capacity(self.max_length);
            seq.push(mask_id);
            seq.extend_from_slice(&ids);
            seq.push(cls_id);

            corpus.sequences.push(seq);
            corpus.labels.push(label);
        }

        tracing::info!(
            "Kept {} of {} records (min_length={}, max_length={})",
            corpus.len(),
            records.len(),
            self.min_length,
            self.max_length,
        );
        Ok(corpus)
    }
}

fn lookup<E: SequenceEncoder>(encoder: &E, token: &str) -> Result<u32> {
    encoder
        .token_id(token)
        .ok_or_else(|| anyhow!("Vocabulary is missing the sentinel token {token}"))
}
