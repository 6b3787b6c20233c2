//! Benchmarks for the polyphonic synthesizer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use loopstation::{
    dsp::Waveform,
    io::AudioBuffer,
    synth::{SoundGenerator, Synthesizer},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

const CHORD: [u8; 8] = [36, 48, 55, 60, 64, 67, 71, 74];

pub fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synth");

    for &size in BLOCK_SIZES {
        let mut out = AudioBuffer::new(2, size);

        // One held note: the cost of a single voice plus pool overhead
        let mut single = Synthesizer::new(SAMPLE_RATE, 8);
        single.note_on(60, 0.8);
        group.bench_with_input(BenchmarkId::new("1_voice", size), &size, |b, _| {
            b.iter(|| {
                out.clear();
                single.render(black_box(&mut out));
            })
        });

        // Every voice sounding, square wave (the branchiest waveform)
        let mut full = Synthesizer::new(SAMPLE_RATE, 8);
        full.params().set_waveform(Waveform::Square);
        for note in CHORD {
            full.note_on(note, 0.8);
        }
        group.bench_with_input(BenchmarkId::new("8_voices", size), &size, |b, _| {
            b.iter(|| {
                out.clear();
                full.render(black_box(&mut out));
            })
        });

        // Constant stealing: a new note every block on an exhausted pool
        let mut stealing = Synthesizer::new(SAMPLE_RATE, 8);
        for note in CHORD {
            stealing.note_on(note, 0.8);
        }
        let mut next = 0usize;
        group.bench_with_input(BenchmarkId::new("stealing", size), &size, |b, _| {
            b.iter(|| {
                stealing.note_on(CHORD[next % CHORD.len()] + 12, 0.8);
                next += 1;
                out.clear();
                stealing.render(black_box(&mut out));
            })
        });
    }

    group.finish();
}
