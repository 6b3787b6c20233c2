//! Benchmarks for complete engine blocks.
//!
//! The transport is running, the timeline is full of notes and every track
//! has a synth, so each block pays for command draining, the timeline
//! snapshot, scheduling, mixing and the click.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use loopstation::{io::AudioBuffer, Engine, EngineConfig, EngineHandle};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn busy_engine(block_size: usize, tracks: usize, notes_per_beat: usize) -> (Engine, EngineHandle) {
    let config = EngineConfig::default()
        .with_sample_rate(SAMPLE_RATE)
        .with_block_size(block_size);
    let (engine, mut handle) = Engine::new(config);

    for i in 1..tracks {
        let _ = handle.add_track(format!("Synth {}", i + 1));
    }

    let step = 1.0 / notes_per_beat as f64;
    for beat in 0..16 {
        for n in 0..notes_per_beat {
            let pitch = 48 + ((beat * 7 + n * 5) % 24) as i32;
            handle.add_note(pitch, beat as f64 + n as f64 * step);
        }
    }

    let _ = handle.set_metronome(true);
    let _ = handle.play();
    (engine, handle)
}

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let mut out = AudioBuffer::new(2, size);

        // Sparse: one track, quarter notes
        let (mut sparse, _sparse_handle) = busy_engine(size, 1, 1);
        group.bench_with_input(BenchmarkId::new("1_track_quarters", size), &size, |b, _| {
            b.iter(|| sparse.process_block(black_box(&mut out)))
        });

        // Dense: four tracks, sixteenth notes
        let (mut dense, _dense_handle) = busy_engine(size, 4, 4);
        group.bench_with_input(BenchmarkId::new("4_tracks_sixteenths", size), &size, |b, _| {
            b.iter(|| dense.process_block(black_box(&mut out)))
        });
    }

    group.finish();
}
