// ============================================================
// Layer 6: Infrastructure Layer
// ============================================================
// File-backed concerns shared by the use cases:
//
//   tokenizer_store.rs  vocab.txt / tokenizer.json → Tokenizer
//   artifacts.rs        the tokenized_data.json + label.json pair
//   metrics.rs          scalar loss log (CSV)
//   model_store.rs      final weights and configs after training
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Records)

/// Tokenizer loading
pub mod tokenizer_store;

/// Persisted builder output
pub mod artifacts;

/// Training metrics CSV writer
pub mod metrics;

/// Final model and config persistence
pub mod model_store;
