// ============================================================
// Layer 2: Application / Use Cases
// ============================================================
// Workflow coordination only: each use case tells the data,
// ml, and infra layers what to do, in order.
//
//   build_use_case.rs  raw JSON → tokenized artifacts
//   train_use_case.rs  artifacts → fine-tuned classifier

// The preprocessing workflow
pub mod build_use_case;

// The fine-tuning workflow
pub mod train_use_case;
