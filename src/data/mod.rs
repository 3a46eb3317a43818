// ============================================================
// Layer 4: Data Pipeline
// ============================================================
// Everything from the raw JSON file to tensor batches.
//
//   train.json (raw records)
//       │
//       ▼
//   JsonRecordLoader  → parses {label, sentence} records
//       │
//       ▼
//   CorpusBuilder     → filters, pads, tokenizes, adds sentinels
//       │
//       ▼
//   (artifacts on disk, see infra::artifacts)
//       │
//       ▼
//   ClassificationDataset → implements Burn's Dataset trait
//       │
//       ▼
//   ClassificationBatcher → stacks samples into tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads the raw JSON array of labeled records
pub mod loader;

/// Newline marking and fixed-length padding/truncation
pub mod preprocessor;

/// Builds the tokenized sequences and one-hot labels
pub mod builder;

/// Implements Burn's Dataset trait for classification samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
