// ============================================================
// Layer 6: Model Store
// ============================================================
// Writes the result of a training run to the output directory:
//
//   model/
//     model.mpk             ← final weights (CompactRecorder)
//     model_config.json     ← architecture + number of labels
//     train_config.json     ← hyper-parameters of the run
//
// Burn's CompactRecorder serialises the module record to
// half-precision MessagePack. Only the final model is written;
// there is no per-epoch snapshot and nothing here reads a
// model back.

use anyhow::{anyhow, Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, FileRecorder},
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{GptClassifier, GptClassifierConfig};

pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    /// Create the store, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create output dir '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Save the final weights. The recorder appends its own extension;
    /// the returned path is the file actually written.
    pub fn save_model<B: Backend>(&self, model: &GptClassifier<B>) -> Result<PathBuf> {
        let path = self.dir.join("model");
        model
            .clone()
            .save_file(path.clone(), &CompactRecorder::new())
            .map_err(|e| anyhow!("Failed to save model to '{}': {e}", path.display()))?;

        tracing::info!("Saved model to '{}'", path.display());
        Ok(path.with_extension(<CompactRecorder as FileRecorder<B>>::file_extension()))
    }

    pub fn save_model_config(&self, cfg: &GptClassifierConfig) -> Result<()> {
        let path = self.dir.join("model_config.json");
        cfg.save(&path)
            .with_context(|| format!("Cannot write model config to '{}'", path.display()))
    }

    pub fn save_train_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::GptConfig;
    use burn::backend::NdArray;

    #[test]
    fn test_writes_all_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let store = ModelStore::new(out.clone()).unwrap();
        let cfg = GptClassifierConfig::new(GptConfig::new(16, 8, 8, 2, 1), 2);
        let model = cfg.init::<NdArray>(&Default::default());

        let weights = store.save_model(&model).unwrap();
        store.save_model_config(&cfg).unwrap();
        store.save_train_config(&TrainConfig::default()).unwrap();

        assert!(weights.exists());
        assert_eq!(weights, out.join("model.mpk"));
        assert!(out.join("model_config.json").exists());

        let saved: TrainConfig = serde_json::from_str(
            &fs::read_to_string(out.join("train_config.json")).unwrap()
        ).unwrap();
        assert_eq!(saved.num_labels, TrainConfig::default().num_labels);
    }
}
