// ============================================================
// Layer 5: Training Loop
// ============================================================
// Fine-tunes the GPT classifier over fixed-size mini-batches.
//
// Per step:
//   forward → last-position logits → BCE loss (÷ accumulation)
//   backward → add grads to the accumulator
// Every `gradient_accumulation` steps:
//   AdamW update (with grad-norm clipping) → advance LR schedule
// Every `log_step` steps:
//   write the loss scalar and print progress
//
// The loop is generic over the autodiff backend so the same code
// runs in f32 or f16 on the GPU, and on NdArray in tests.
//
// Reference: Burn Book §5, Loshchilov & Hutter (2019) AdamW

use anyhow::{ensure, Result};
use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    grad_clipping::GradientClippingConfig,
    optim::{AdamWConfig, GradientsAccumulator, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::ClassificationBatcher, dataset::ClassificationDataset};
use crate::infra::metrics::MetricsWriter;
use crate::ml::model::{GptClassifier, GptClassifierConfig};
use crate::ml::schedule::WarmupLinearSchedule;

/// What a finished run hands back to the caller.
pub struct TrainOutcome<B: AutodiffBackend> {
    pub model:           GptClassifier<B>,
    pub steps:           usize,
    pub optimizer_steps: usize,
    pub last_loss:       f64,
}

/// Number of optimizer updates the schedule is stretched over.
/// Counted from every loaded sample, including a trailing partial
/// batch, and kept fractional.
pub fn total_optimizer_steps(samples: usize, epochs: usize, batch_size: usize, accumulation: usize) -> f64 {
    samples as f64 * epochs as f64 / batch_size as f64 / accumulation as f64
}

pub fn run_training<B: AutodiffBackend>(
    cfg:       &TrainConfig,
    model_cfg: &GptClassifierConfig,
    mut dataset: ClassificationDataset,
    metrics:   &MetricsWriter,
    device:    B::Device,
) -> Result<TrainOutcome<B>> {
    cfg.validate()?;

    let total_steps = total_optimizer_steps(
        dataset.len(), cfg.epochs, cfg.batch_size, cfg.gradient_accumulation,
    );

    // Partial trailing batches are never trained on.
    dataset.truncate_to_full_batches(cfg.batch_size);
    ensure!(
        !dataset.is_empty(),
        "not enough tokenized examples for one batch of {}",
        cfg.batch_size
    );
    if let Some(seq_len) = dataset.seq_len() {
        ensure!(
            seq_len <= model_cfg.gpt.n_ctx,
            "sequences have {} tokens but the model context is {}",
            seq_len,
            model_cfg.gpt.n_ctx
        );
    }
    if let Some(max_id) = dataset.max_token_id() {
        ensure!(
            (max_id as usize) < model_cfg.gpt.vocab_size,
            "token id {} is outside the model vocabulary of {}",
            max_id,
            model_cfg.gpt.vocab_size
        );
    }

    B::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: GptClassifier<B> = model_cfg.init(&device);
    println!("number of parameters: {}", model.num_params());

    // ── AdamW with gradient-norm clipping ─────────────────────────────────────
    let optim_cfg = AdamWConfig::new()
        .with_weight_decay(0.0)
        .with_grad_clipping(Some(GradientClippingConfig::Norm(cfg.max_grad_norm as f32)));
    let mut optim = optim_cfg.init::<B, GptClassifier<B>>();
    let mut accumulator = GradientsAccumulator::<GptClassifier<B>>::new();

    let mut schedule = WarmupLinearSchedule::new(cfg.lr, cfg.warmup_steps, total_steps);
    tracing::info!(
        "{} samples, {} epochs, {:.1} optimizer steps (warmup {})",
        dataset.len(), cfg.epochs, total_steps, cfg.warmup_steps
    );

    // ── Data loader: in order, on this thread ─────────────────────────────────
    let batcher = ClassificationBatcher::<B>::new(device.clone());
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(cfg.batch_size)
        .build(dataset);

    let accumulation = cfg.gradient_accumulation;
    let mut overall_step    = 0usize;
    let mut optimizer_steps = 0usize;
    let mut running_loss    = 0.0f64;
    let mut last_loss       = f64::NAN;

    println!("starting training");
    for epoch in 1..=cfg.epochs {
        println!("epoch {}", epoch);
        println!("time: {}", chrono::Local::now());

        for (step, batch) in loader.iter().enumerate() {
            let (loss, _) = model.forward_loss(batch.input_ids, batch.labels);
            let loss = if accumulation > 1 { loss / accumulation as f64 } else { loss };
            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            last_loss = loss_val * accumulation as f64;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            accumulator.accumulate(&model, grads);

            if (overall_step + 1) % accumulation == 0 {
                running_loss += loss_val;
                let lr = schedule.lr();
                model = optim.step(lr, model, accumulator.grads());
                schedule.step();
                optimizer_steps += 1;
                tracing::debug!("optimizer step {} lr={:.3e}", optimizer_steps, lr);
            }

            if (overall_step + 1) % cfg.log_step == 0 {
                metrics.add_scalar("loss", last_loss, overall_step)?;
                let updates_in_window = (cfg.log_step / accumulation) as f64;
                println!(
                    "now time: {}. Step {} of epoch {}, loss {}",
                    chrono::Local::now().format("%H:%M"),
                    step + 1,
                    epoch,
                    running_loss * accumulation as f64 / updates_in_window,
                );
                running_loss = 0.0;
            }
            overall_step += 1;
        }
    }

    tracing::info!("Training complete after {} steps", overall_step);
    Ok(TrainOutcome { model, steps: overall_step, optimizer_steps, last_loss })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builder::TokenizedCorpus;
    use crate::ml::model::GptConfig;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn dataset(n: usize) -> ClassificationDataset {
        let corpus = TokenizedCorpus {
            sequences: (0..n).map(|i| vec![4, 5 + (i % 7) as u32, 6, 7, 8, 2]).collect(),
            labels:    (0..n).map(|i| if i % 2 == 0 { vec![1, 0] } else { vec![0, 1] }).collect(),
        };
        ClassificationDataset::from_corpus(corpus, 2).unwrap()
    }

    fn config(dir: &std::path::Path) -> TrainConfig {
        TrainConfig {
            epochs: 2,
            batch_size: 2,
            gradient_accumulation: 2,
            log_step: 2,
            warmup_steps: 1,
            lr: 1e-3,
            writer_dir: dir.display().to_string(),
            ..TrainConfig::default()
        }
    }

    fn model_cfg() -> GptClassifierConfig {
        GptClassifierConfig::new(GptConfig::new(16, 8, 8, 2, 1), 2)
    }

    #[test]
    fn test_total_optimizer_steps() {
        assert_eq!(total_optimizer_steps(100, 5, 2, 1), 250.0);
        assert_eq!(total_optimizer_steps(100, 5, 2, 4), 62.5);
        // a trailing partial batch still counts
        assert_eq!(total_optimizer_steps(5, 2, 2, 2), 2.5);
    }

    #[test]
    fn test_short_run_steps_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let metrics = MetricsWriter::new(dir.path()).unwrap();

        // 5 samples → 2 full batches per epoch
        let outcome = run_training::<TestBackend>(
            &cfg, &model_cfg(), dataset(5), &metrics, Default::default(),
        ).unwrap();

        assert_eq!(outcome.steps, 4);
        assert_eq!(outcome.optimizer_steps, 2);
        assert!(outcome.last_loss.is_finite());

        let events = metrics.read_events().unwrap();
        assert_eq!(events.iter().map(|e| e.step).collect::<Vec<_>>(), vec![1, 3]);
        assert!(events.iter().all(|e| e.tag == "loss"));
    }

    #[test]
    fn test_rejects_log_step_not_multiple_of_accumulation() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig { log_step: 3, ..config(dir.path()) };
        let metrics = MetricsWriter::new(dir.path()).unwrap();
        let res = run_training::<TestBackend>(&cfg, &model_cfg(), dataset(4), &metrics, Default::default());
        assert!(res.is_err());
    }

    #[test]
    fn test_rejects_dataset_smaller_than_a_batch() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig { batch_size: 8, ..config(dir.path()) };
        let metrics = MetricsWriter::new(dir.path()).unwrap();
        let res = run_training::<TestBackend>(&cfg, &model_cfg(), dataset(4), &metrics, Default::default());
        assert!(res.is_err());
    }

    #[test]
    fn test_rejects_sequences_longer_than_context() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let metrics = MetricsWriter::new(dir.path()).unwrap();
        let small = GptClassifierConfig::new(GptConfig::new(16, 4, 8, 2, 1), 2);
        let res = run_training::<TestBackend>(&cfg, &small, dataset(4), &metrics, Default::default());
        assert!(res.is_err());
    }

    #[test]
    fn test_rejects_token_ids_outside_vocab() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let metrics = MetricsWriter::new(dir.path()).unwrap();
        let corpus = TokenizedCorpus {
            sequences: vec![vec![4, 5, 6, 7, 8, 2], vec![4, 40, 6, 7, 8, 2]],
            labels:    vec![vec![1, 0], vec![0, 1]],
        };
        let data = ClassificationDataset::from_corpus(corpus, 2).unwrap();
        let res = run_training::<TestBackend>(&cfg, &model_cfg(), data, &metrics, Default::default());
        let err = res.err().unwrap().to_string();
        assert!(err.contains("40"), "{err}");
    }
}
