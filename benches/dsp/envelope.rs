//! Voice envelope cost per stage.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use loopstation::dsp::{Envelope, EnvelopeState};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// The default voice envelope, run forward until it reaches `stage`.
fn envelope_in(stage: EnvelopeState) -> Envelope {
    let mut env = Envelope::default();
    env.note_on();
    if stage == EnvelopeState::Attack {
        return env;
    }
    while env.state() != EnvelopeState::Sustain {
        env.next_sample(SAMPLE_RATE);
    }
    if stage == EnvelopeState::Release {
        env.note_off(SAMPLE_RATE);
    }
    env
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut block = vec![0.0f32; size];

        for (label, stage) in [
            ("attack", EnvelopeState::Attack),
            ("sustain", EnvelopeState::Sustain),
            ("release", EnvelopeState::Release),
        ] {
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter_batched_ref(
                    || envelope_in(stage),
                    |env| {
                        for out in block.iter_mut() {
                            *out = env.next_sample(SAMPLE_RATE);
                        }
                        black_box(&block);
                    },
                    criterion::BatchSize::SmallInput,
                )
            });
        }
    }

    group.finish();
}
