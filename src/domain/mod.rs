// ============================================================
// Layer 3: Domain Layer
// ============================================================
// Plain Rust structs and traits describing what the system
// works with: labeled text records and the abstractions that
// load them and turn them into token ids.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

// A labeled training record and its one-hot label
pub mod record;

// Core abstractions (traits) that other layers implement
pub mod traits;
