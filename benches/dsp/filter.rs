//! Benchmarks for the state-variable low-pass filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use loopstation::dsp::SVFilter;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let mut filter = SVFilter::lowpass(1_000.0, 0.707, SAMPLE_RATE);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // High resonance, and coefficients recomputed every block as the
        // voices do when the cutoff is being swept.
        let mut filter = SVFilter::lowpass(1_000.0, 12.0, SAMPLE_RATE);
        let mut cutoff = 200.0f32;
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("swept_resonant", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 8_000.0 { 200.0 } else { cutoff * 1.1 };
                filter.set_params(black_box(cutoff), 12.0, SAMPLE_RATE);
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
