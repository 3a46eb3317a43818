// ============================================================
// Layer 3: Core Traits (Abstractions)
// ============================================================
// The builder only needs two capabilities: something that hands
// it raw records, and something that maps text to token ids.
// Programming against these traits keeps the builder testable
// with an in-memory source and a toy encoder.
//
//   - JsonRecordLoader implements RecordSource
//   - tokenizers::Tokenizer implements SequenceEncoder

use anyhow::Result;
use crate::domain::record::RawRecord;

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the labeled training records.
pub trait RecordSource {
    /// Load every record, in file order.
    fn load_all(&self) -> Result<Vec<RawRecord>>;
}

// ─── SequenceEncoder ──────────────────────────────────────────────────────────
/// Any component that turns text into vocabulary ids.
pub trait SequenceEncoder {
    /// Tokenize `text` without adding any special tokens.
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Look up the id of a single vocabulary entry.
    fn token_id(&self, token: &str) -> Option<u32>;
}
