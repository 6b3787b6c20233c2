//! Real-world scenario benchmarks.
//!
//! A full voice pool, and complete engine blocks with the sequencer
//! running and several tracks mixed.

mod engine;
mod synth;

pub use engine::bench_engine;
pub use synth::bench_synth;
