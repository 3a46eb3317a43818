// ============================================================
// Layer 2: BuildUseCase
// ============================================================
// Preprocessing stage of the job:
//
//   Step 1: Load the tokenizer        (Layer 6 - infra)
//   Step 2: Load raw records          (Layer 4 - data)
//   Step 3: Build tokenized corpus    (Layer 4 - data)
//   Step 4: Persist both artifacts    (Layer 6 - infra)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{builder::CorpusBuilder, loader::JsonRecordLoader};
use crate::domain::traits::RecordSource;
use crate::infra::{artifacts::ArtifactStore, tokenizer_store::TokenizerStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub raw_data_path:       String,
    pub tokenized_data_path: String,
    pub tokenizer_path:      String,
    /// Sentences must be longer than this many characters
    pub min_length:          usize,
    /// Full sequence length, sentinels included
    pub max_length:          usize,
    pub num_labels:          usize,
}

pub struct BuildUseCase {
    config: BuildConfig,
}

impl BuildUseCase {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Returns the number of examples written.
    pub fn execute(&self) -> Result<usize> {
        let cfg = &self.config;
        tracing::info!("Building tokenized data from '{}'", cfg.raw_data_path);

        let tokenizer = TokenizerStore::new(&cfg.tokenizer_path).load()?;
        let records   = JsonRecordLoader::new(&cfg.raw_data_path).load_all()?;

        let builder = CorpusBuilder::new(cfg.min_length, cfg.max_length, cfg.num_labels)?;
        let corpus  = builder.build(&records, &tokenizer)?;
        if corpus.is_empty() {
            tracing::warn!(
                "No record is longer than {} characters; writing empty artifacts",
                cfg.min_length
            );
        }

        ArtifactStore::new(&cfg.tokenized_data_path).save(&corpus)?;
        Ok(corpus.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_end_to_end_build() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = dir.path().join("vocab.txt");
        fs::write(&vocab, "[PAD]\n[UNK]\n[CLS]\n[SEP]\n[MASK]\n0\n你\n好\n坏\n").unwrap();
        let raw = dir.path().join("train.json");
        fs::write(&raw, r#"[
            {"label": 1, "sentence": "你好"},
            {"label": 0, "sentence": "坏"},
            {"label": 0, "sentence": "坏坏坏坏坏坏坏坏"}
        ]"#).unwrap();

        let cfg = BuildConfig {
            raw_data_path:       raw.display().to_string(),
            tokenized_data_path: dir.path().join("tokenized").display().to_string(),
            tokenizer_path:      vocab.display().to_string(),
            min_length:          1,
            max_length:          6,
            num_labels:          2,
        };
        let written = BuildUseCase::new(cfg.clone()).execute().unwrap();
        assert_eq!(written, 2);

        let corpus = ArtifactStore::new(&cfg.tokenized_data_path).load().unwrap();
        assert_eq!(corpus.labels, vec![vec![0, 1], vec![1, 0]]);
        // "你好00": the "00" run is one unknown word, so the body is
        // refilled with the "0" id to keep four slots
        assert_eq!(corpus.sequences[0], vec![4, 6, 7, 1, 5, 2]);
        assert_eq!(corpus.sequences[1], vec![4, 8, 8, 8, 8, 2]);
        assert!(corpus.sequences.iter().all(|s| s.len() == 6));
    }

    #[test]
    fn test_all_records_filtered_writes_empty_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = dir.path().join("vocab.txt");
        fs::write(&vocab, "[PAD]\n[UNK]\n[CLS]\n[SEP]\n[MASK]\n0\n坏\n").unwrap();
        let raw = dir.path().join("train.json");
        fs::write(&raw, r#"[{"label": 0, "sentence": "坏"}]"#).unwrap();

        let cfg = BuildConfig {
            raw_data_path:       raw.display().to_string(),
            tokenized_data_path: dir.path().join("tokenized").display().to_string(),
            tokenizer_path:      vocab.display().to_string(),
            min_length:          5,
            max_length:          6,
            num_labels:          2,
        };
        assert_eq!(BuildUseCase::new(cfg.clone()).execute().unwrap(), 0);
        let corpus = ArtifactStore::new(&cfg.tokenized_data_path).load().unwrap();
        assert!(corpus.is_empty());
    }
}
