//! Render-path benchmarks.
//!
//! A block has to be finished well inside its deadline: 512 frames at 48 kHz
//! leave 10.67 ms, 64 frames only 1.33 ms. `dsp/*` covers the primitives a
//! voice is built from, `scenarios/*` whole synths and a busy engine.

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Typical device callback sizes.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

pub const SAMPLE_RATE: f32 = 48_000.0;

criterion_group!(
    benches,
    dsp::bench_oscillator,
    dsp::bench_filter,
    dsp::bench_envelope,
    scenarios::bench_synth,
    scenarios::bench_engine,
);
criterion_main!(benches);
