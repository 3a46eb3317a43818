// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// Parses command line arguments with clap and routes to the
// use cases in Layer 2.
//
//   1. `build`  tokenizes raw labeled text into artifacts
//   2. `train`  fine-tunes the classifier (`--raw` builds first)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BuildArgs, Commands, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "gpt-classifier",
    version,
    about = "Fine-tune a GPT-style model with a classification head on labeled text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Build(args) => run_build(args),
            Commands::Train(args) => run_train(args),
        }
    }
}

fn run_build(args: BuildArgs) -> Result<()> {
    use crate::application::build_use_case::{BuildConfig, BuildUseCase};
    use crate::application::train_use_case::load_model_config;

    let max_length = match args.max_length {
        Some(n) => n,
        None => load_model_config(&args.model_config)?.n_ctx,
    };

    let cfg = BuildConfig {
        raw_data_path:       args.raw_data_path,
        tokenized_data_path: args.tokenized_data_path,
        tokenizer_path:      args.tokenizer_path,
        min_length:          args.min_length,
        max_length,
        num_labels:          args.num_labels,
    };
    let written = BuildUseCase::new(cfg).execute()?;
    println!("finish raw data loading: {} examples", written);
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};

    let cfg: TrainConfig = args.into();
    println!("args:\n{:#?}", cfg);
    TrainUseCase::new(cfg).execute()?;

    println!("Training complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_defaults() {
        let cli = Cli::try_parse_from(["gpt-classifier", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(args.batch_size, 2);
        assert_eq!(args.lr, 1.5e-4);
        assert_eq!(args.device, "0,1,2,3");
        assert!(!args.raw);
        assert!(!args.fp16);
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "gpt-classifier", "train", "--raw", "--fp16",
            "--gradient-accumulation", "4", "--log-step", "8", "--num-labels", "3",
        ]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: crate::application::train_use_case::TrainConfig = args.into();
        assert!(cfg.raw && cfg.fp16);
        assert_eq!(cfg.gradient_accumulation, 4);
        assert_eq!(cfg.log_step, 8);
        assert_eq!(cfg.num_labels, 3);
    }

    #[test]
    fn test_build_max_length_override() {
        let cli = Cli::try_parse_from(["gpt-classifier", "build", "--max-length", "64"]).unwrap();
        let Commands::Build(args) = cli.command else { panic!("expected build") };
        assert_eq!(args.max_length, Some(64));
        assert_eq!(args.min_length, 0);
    }
}
