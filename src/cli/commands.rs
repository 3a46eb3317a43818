// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `build` and `train`, and all
// their flags. clap's derive macros generate help text, error
// messages for bad values, and type conversion.

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tokenize the raw labeled JSON into training artifacts
    Build(BuildArgs),

    /// Fine-tune the GPT classifier on the tokenized artifacts
    Train(TrainArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Raw training data: a JSON array of {label, sentence}
    #[arg(long, default_value = "data/train.json")]
    pub raw_data_path: String,

    /// Directory for tokenized_data.json and label.json
    #[arg(long, default_value = "data/tokenized/")]
    pub tokenized_data_path: String,

    /// vocab.txt or tokenizer.json
    #[arg(long, default_value = "cache/vocab_small.txt")]
    pub tokenizer_path: String,

    /// Model config; its n_ctx is the sequence length
    #[arg(long, default_value = "config/model_config_small.json")]
    pub model_config: String,

    /// Sequence length override (sentinels included)
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Sentences must be longer than this many characters
    #[arg(long, default_value_t = 0)]
    pub min_length: usize,

    /// Number of classification labels
    #[arg(long, default_value_t = 2)]
    pub num_labels: usize,
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Accelerators to make visible, e.g. "0,1,2,3"
    #[arg(long, default_value = "0,1,2,3")]
    pub device: String,

    /// GPT-2 style model config JSON
    #[arg(long, default_value = "config/model_config_small.json")]
    pub model_config: String,

    /// vocab.txt or tokenizer.json
    #[arg(long, default_value = "cache/vocab_small.txt")]
    pub tokenizer_path: String,

    #[arg(long, default_value = "data/train.json")]
    pub raw_data_path: String,

    #[arg(long, default_value = "data/tokenized/")]
    pub tokenized_data_path: String,

    /// Tokenize the raw data before training
    #[arg(long)]
    pub raw: bool,

    #[arg(long, default_value_t = 5)]
    pub epochs: usize,

    #[arg(long, default_value_t = 2)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 1.5e-4)]
    pub lr: f64,

    #[arg(long, default_value_t = 2000)]
    pub warmup_steps: usize,

    /// Report the loss every N steps; a multiple of --gradient-accumulation
    #[arg(long, default_value_t = 1)]
    pub log_step: usize,

    #[arg(long, default_value_t = 1)]
    pub gradient_accumulation: usize,

    /// Half-precision training (needs f16 support on the GPU)
    #[arg(long)]
    pub fp16: bool,

    #[arg(long, default_value_t = 1.0)]
    pub max_grad_norm: f64,

    /// Sentences must be longer than this many characters
    #[arg(long, default_value_t = 0)]
    pub min_length: usize,

    /// Where the trained model is written
    #[arg(long, default_value = "model/")]
    pub output_dir: String,

    /// Where the loss log is written
    #[arg(long, default_value = "tensorboard_summary/")]
    pub writer_dir: String,

    /// Number of classification labels
    #[arg(long, default_value_t = 2)]
    pub num_labels: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            device:                a.device,
            model_config:          a.model_config,
            tokenizer_path:        a.tokenizer_path,
            raw_data_path:         a.raw_data_path,
            tokenized_data_path:   a.tokenized_data_path,
            raw:                   a.raw,
            epochs:                a.epochs,
            batch_size:            a.batch_size,
            lr:                    a.lr,
            warmup_steps:          a.warmup_steps,
            log_step:              a.log_step,
            gradient_accumulation: a.gradient_accumulation,
            fp16:                  a.fp16,
            max_grad_norm:         a.max_grad_norm,
            min_length:            a.min_length,
            output_dir:            a.output_dir,
            writer_dir:            a.writer_dir,
            num_labels:            a.num_labels,
            seed:                  a.seed,
        }
    }
}
