// ============================================================
// Layer 5: ML / Model Layer (Burn)
// ============================================================
// All Burn model and optimisation code lives here.
//
//   model.rs     GPT decoder (token + position embeddings,
//                causal self-attention blocks, final norm)
//                with a linear classification head on the
//                last position
//
//   schedule.rs  learning-rate warmup then linear decay
//
//   trainer.rs   the fine-tuning loop: BCE loss, gradient
//                accumulation, AdamW, periodic logging
//
// Reference: Radford et al. (2019) GPT-2
//            Burn Book §3 (Building Blocks), §5 (Training)

/// GPT backbone and classification head
pub mod model;

/// Warmup + linear decay learning-rate schedule
pub mod schedule;

/// Full training loop
pub mod trainer;
