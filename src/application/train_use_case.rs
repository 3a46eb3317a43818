// ============================================================
// Layer 2: TrainUseCase
// ============================================================
// Orchestrates a full fine-tuning run in order:
//
//   Step 1: Check hyper-parameters
//   Step 2: Expose the selected accelerators   (environment)
//   Step 3: Load the model config              (Layer 5 - ml)
//   Step 4: Build tokenized data if --raw      (Layer 2 - build)
//   Step 5: Load the artifacts as a dataset    (Layer 4/6)
//   Step 6: Run the training loop              (Layer 5 - ml)
//   Step 7: Save the final model and configs   (Layer 6 - infra)
//
// The numeric precision picks the backend type; everything
// below this layer is generic over it.

use anyhow::{anyhow, ensure, Context, Result};
use burn::{
    backend::{wgpu::WgpuDevice, Autodiff, Wgpu},
    prelude::*,
    tensor::{backend::AutodiffBackend, f16},
};
use serde::{Deserialize, Serialize};

use crate::application::build_use_case::{BuildConfig, BuildUseCase};
use crate::data::dataset::ClassificationDataset;
use crate::infra::{artifacts::ArtifactStore, metrics::MetricsWriter, model_store::ModelStore};
use crate::ml::model::{GptClassifierConfig, GptConfig};
use crate::ml::trainer::run_training;

type F32Backend = Autodiff<Wgpu>;
type F16Backend = Autodiff<Wgpu<f16, i32>>;

/// Environment variable that limits which accelerators the
/// process can see.
pub const VISIBLE_DEVICES_ENV: &str = "CUDA_VISIBLE_DEVICES";

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyper-parameters for a training run. Serialisable so the
// run's settings are stored next to the trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Comma-separated accelerator indices, e.g. "0,1"
    pub device:                String,
    pub model_config:          String,
    pub tokenizer_path:        String,
    pub raw_data_path:         String,
    pub tokenized_data_path:   String,
    /// Run the builder before training
    pub raw:                   bool,
    pub epochs:                usize,
    pub batch_size:            usize,
    pub lr:                    f64,
    pub warmup_steps:          usize,
    /// Must be a multiple of gradient_accumulation
    pub log_step:              usize,
    pub gradient_accumulation: usize,
    /// Train in half precision
    pub fp16:                  bool,
    pub max_grad_norm:         f64,
    pub min_length:            usize,
    pub output_dir:            String,
    pub writer_dir:            String,
    pub num_labels:            usize,
    pub seed:                  u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            device:                "0,1,2,3".to_string(),
            model_config:          "config/model_config_small.json".to_string(),
            tokenizer_path:        "cache/vocab_small.txt".to_string(),
            raw_data_path:         "data/train.json".to_string(),
            tokenized_data_path:   "data/tokenized/".to_string(),
            raw:                   false,
            epochs:                5,
            batch_size:            2,
            lr:                    1.5e-4,
            warmup_steps:          2000,
            log_step:              1,
            gradient_accumulation: 1,
            fp16:                  false,
            max_grad_norm:         1.0,
            min_length:            0,
            output_dir:            "model/".to_string(),
            writer_dir:            "tensorboard_summary/".to_string(),
            num_labels:            2,
            seed:                  42,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be positive");
        ensure!(self.gradient_accumulation > 0, "gradient_accumulation must be positive");
        ensure!(self.log_step > 0, "log_step must be positive");
        ensure!(
            self.log_step % self.gradient_accumulation == 0,
            "log_step ({}) must be a multiple of gradient_accumulation ({})",
            self.log_step,
            self.gradient_accumulation
        );
        ensure!(self.num_labels > 0, "num_labels must be positive");
        Ok(())
    }

    /// Builder settings for the `--raw` path.
    pub fn build_config(&self, max_length: usize) -> BuildConfig {
        BuildConfig {
            raw_data_path:       self.raw_data_path.clone(),
            tokenized_data_path: self.tokenized_data_path.clone(),
            tokenizer_path:      self.tokenizer_path.clone(),
            min_length:          self.min_length,
            max_length,
            num_labels:          self.num_labels,
        }
    }
}

/// Parse a device flag such as "0,1,2,3" into indices.
pub fn parse_device_list(flag: &str) -> Result<Vec<usize>> {
    flag.split(',')
        .map(str::trim)
        .map(|s| s.parse::<usize>().with_context(|| format!("Bad device index '{s}' in '{flag}'")))
        .collect()
}

/// Load a GPT-2 style model config JSON file.
pub fn load_model_config(path: &str) -> Result<GptConfig> {
    GptConfig::load(path).map_err(|e| anyhow!("Cannot load model config '{path}': {e}"))
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Fail fast on bad hyper-parameters ─────────────────────────
        cfg.validate()?;

        // ── Step 2: Accelerator visibility ────────────────────────────────────
        let devices = parse_device_list(&cfg.device)?;
        std::env::set_var(VISIBLE_DEVICES_ENV, &cfg.device);
        tracing::info!("{}={}", VISIBLE_DEVICES_ENV, cfg.device);
        if devices.len() > 1 {
            tracing::warn!(
                "{} devices listed; training runs on a single device",
                devices.len()
            );
        }

        // ── Step 3: Model config ──────────────────────────────────────────────
        let gpt_cfg = load_model_config(&cfg.model_config)?;
        println!("config:\n{}", gpt_cfg);
        let model_cfg = GptClassifierConfig::new(gpt_cfg, cfg.num_labels);

        // ── Step 4: Optional preprocessing ────────────────────────────────────
        if cfg.raw {
            println!("building files");
            BuildUseCase::new(cfg.build_config(model_cfg.gpt.n_ctx)).execute()?;
            println!("files built");
        }

        // ── Step 5: Dataset ───────────────────────────────────────────────────
        let corpus  = ArtifactStore::new(&cfg.tokenized_data_path).load()?;
        let dataset = ClassificationDataset::from_corpus(corpus, cfg.num_labels)?;

        // ── Step 6/7: Train on the selected precision and save ────────────────
        let metrics = MetricsWriter::new(&cfg.writer_dir)?;
        let store   = ModelStore::new(&cfg.output_dir)?;
        store.save_train_config(cfg)?;
        store.save_model_config(&model_cfg)?;

        let device = WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?} (fp16={})", device, cfg.fp16);
        if cfg.fp16 {
            train_and_save::<F16Backend>(cfg, &model_cfg, dataset, &metrics, &store, device)
        } else {
            train_and_save::<F32Backend>(cfg, &model_cfg, dataset, &metrics, &store, device)
        }
    }
}

fn train_and_save<B: AutodiffBackend>(
    cfg:       &TrainConfig,
    model_cfg: &GptClassifierConfig,
    dataset:   ClassificationDataset,
    metrics:   &MetricsWriter,
    store:     &ModelStore,
    device:    B::Device,
) -> Result<()> {
    let outcome = run_training::<B>(cfg, model_cfg, dataset, metrics, device)?;
    tracing::info!(
        "{} steps, {} optimizer updates, last loss {:.4}",
        outcome.steps,
        outcome.optimizer_steps,
        outcome.last_loss
    );
    store.save_model(&outcome.model)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_log_step_must_be_multiple_of_accumulation() {
        let cfg = TrainConfig { log_step: 3, gradient_accumulation: 2, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = TrainConfig { log_step: 4, gradient_accumulation: 2, ..TrainConfig::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let cfg = TrainConfig { batch_size: 0, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_parse_device_list() {
        assert_eq!(parse_device_list("0,1,2,3").unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(parse_device_list(" 2 ").unwrap(), vec![2]);
        assert!(parse_device_list("0,,1").is_err());
        assert!(parse_device_list("gpu0").is_err());
    }

    #[test]
    fn test_build_config_uses_context_length() {
        let cfg = TrainConfig { min_length: 3, num_labels: 5, ..TrainConfig::default() };
        let b = cfg.build_config(128);
        assert_eq!(b.max_length, 128);
        assert_eq!(b.min_length, 3);
        assert_eq!(b.num_labels, 5);
        assert_eq!(b.raw_data_path, cfg.raw_data_path);
    }

    #[test]
    fn test_load_model_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_config_small.json");
        std::fs::write(&path, r#"{"n_ctx": 300, "n_embd": 768, "n_head": 12,
            "n_layer": 10, "n_positions": 300, "vocab_size": 13317}"#).unwrap();
        let cfg = load_model_config(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.n_layer, 10);
        assert_eq!(cfg.vocab_size, 13317);
        assert_eq!(cfg.attn_dropout(), 0.1);
    }
}
