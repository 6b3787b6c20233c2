//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use loopstation::dsp::{Oscillator, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn render(osc: &mut Oscillator, waveform: Waveform, buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = osc.next_sample(waveform);
    }
}

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for waveform in Waveform::ALL {
            let mut osc = Oscillator::new();
            osc.set_frequency(440.0, SAMPLE_RATE);

            group.bench_with_input(
                BenchmarkId::new(waveform.name().to_lowercase(), size),
                &size,
                |b, _| {
                    b.iter(|| render(&mut osc, black_box(waveform), black_box(&mut buffer)))
                },
            );
        }
    }

    group.finish();
}
