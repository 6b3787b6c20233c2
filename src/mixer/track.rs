//! Instrument tracks.
//!
//! A track is split in two halves that share a [`TrackControls`] block:
//!
//! - [`Track`] lives on the render side. It owns the current generator and
//!   renders it with the track's volume and pan.
//! - [`TrackHandle`] lives on the control side. It edits the controls and
//!   hot-swaps the generator.
//!
//! Generators cross between the two over a pair of SPSC queues. The handle
//! pushes a prepared replacement; the render side swaps it in at the start of
//! a block and hands the displaced one back on the retirement queue, so the
//! control path is the only place a generator is ever dropped.

use std::{
    f32::consts::FRAC_PI_4,
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
    },
};

use rtrb::{Consumer, Producer, RingBuffer};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::EngineConfig,
    error::{EngineError, Result},
    io::AudioBuffer,
    sequencing::EventList,
    synth::{SoundGenerator, SynthParams},
};

pub const DEFAULT_VOLUME: f32 = 0.8;
pub const MAX_VOLUME: f32 = 2.0;

/// Pending swaps a track can hold before the render side picks them up.
const SWAP_CAPACITY: usize = 4;
/// Displaced generators waiting for the control path to drop them.
const RETIRE_CAPACITY: usize = 8;

type GeneratorSlot = Option<Box<dyn SoundGenerator>>;

/// Per-track mix settings, shared by both halves of a track.
#[derive(Debug)]
pub struct TrackControls {
    name: String,
    volume: AtomicU32,
    pan: AtomicU32,
    muted: AtomicBool,
    soloed: AtomicBool,
}

impl TrackControls {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume: AtomicU32::new(DEFAULT_VOLUME.to_bits()),
            pan: AtomicU32::new(0.0f32.to_bits()),
            muted: AtomicBool::new(false),
            soloed: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    pub fn set_volume(&self, volume: f32) {
        let volume = if volume.is_nan() { DEFAULT_VOLUME } else { volume };
        self.volume
            .store(volume.clamp(0.0, MAX_VOLUME).to_bits(), Ordering::Relaxed);
    }

    pub fn pan(&self) -> f32 {
        f32::from_bits(self.pan.load(Ordering::Relaxed))
    }

    pub fn set_pan(&self, pan: f32) {
        let pan = if pan.is_nan() { 0.0 } else { pan };
        self.pan
            .store(pan.clamp(-1.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }

    pub fn is_soloed(&self) -> bool {
        self.soloed.load(Ordering::Relaxed)
    }

    pub fn set_soloed(&self, soloed: bool) {
        self.soloed.store(soloed, Ordering::Relaxed);
    }

    /// Constant-power stereo gains for the current volume and pan.
    pub fn stereo_gains(&self) -> (f32, f32) {
        let volume = self.volume();
        let angle = (self.pan() + 1.0) * FRAC_PI_4;
        (volume * angle.cos(), volume * angle.sin())
    }
}

/// Control-side view of one track, for status displays.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub index: usize,
    pub name: String,
    pub volume: f32,
    pub pan: f32,
    pub muted: bool,
    pub soloed: bool,
    pub has_generator: bool,
    pub generator: Option<String>,
}

/// Render half of a track.
pub struct Track {
    index: usize,
    controls: Arc<TrackControls>,
    generator: GeneratorSlot,
    incoming: Consumer<GeneratorSlot>,
    retired: Producer<Box<dyn SoundGenerator>>,
}

impl Track {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn controls(&self) -> &TrackControls {
        &self.controls
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Apply pending generator swaps in the order they were queued.
    ///
    /// The swap waits while the retirement queue is full: the displaced
    /// generator must never be dropped here.
    pub fn adopt_generator(&mut self) -> bool {
        let mut swapped = false;
        while !self.retired.is_full() {
            let Ok(next) = self.incoming.pop() else {
                break;
            };
            if let Some(old) = std::mem::replace(&mut self.generator, next) {
                // Cannot fail: there was a free slot a moment ago and this
                // is the only producer.
                let _ = self.retired.push(old);
            }
            swapped = true;
        }
        swapped
    }

    /// Forward this track's note events to its generator.
    pub fn dispatch(&mut self, events: &EventList) {
        let Some(generator) = self.generator.as_mut() else {
            return;
        };
        for message in events.for_track(self.index) {
            generator.handle(message);
        }
    }

    /// Dispatch events, then overwrite `buffer` with this block's audio.
    ///
    /// A muted track or one without a generator leaves `buffer` silent.
    pub fn process(&mut self, buffer: &mut AudioBuffer, events: &EventList) {
        self.dispatch(events);
        buffer.clear();

        if self.controls.is_muted() {
            return;
        }
        let Some(generator) = self.generator.as_mut() else {
            return;
        };
        generator.render(buffer);

        if buffer.num_channels() >= 2 {
            let (left, right) = self.controls.stereo_gains();
            buffer.apply_gain(0, left);
            buffer.apply_gain(1, right);
            let volume = self.controls.volume();
            for ch in 2..buffer.num_channels() {
                buffer.apply_gain(ch, volume);
            }
        } else {
            buffer.apply_gain_all(self.controls.volume());
        }
    }

    pub fn all_notes_off(&mut self) {
        if let Some(generator) = self.generator.as_mut() {
            generator.all_notes_off();
        }
    }
}

/// Control half of a track.
pub struct TrackHandle {
    index: usize,
    controls: Arc<TrackControls>,
    outgoing: Producer<GeneratorSlot>,
    retired: Consumer<Box<dyn SoundGenerator>>,
    params: Option<Arc<SynthParams>>,
    generator_name: Option<&'static str>,
    config: EngineConfig,
}

/// Build both halves of a new track.
pub fn track(index: usize, name: impl Into<String>, config: &EngineConfig) -> (Track, TrackHandle) {
    let controls = Arc::new(TrackControls::new(name));
    let (swap_tx, swap_rx) = RingBuffer::new(SWAP_CAPACITY);
    let (retire_tx, retire_rx) = RingBuffer::new(RETIRE_CAPACITY);

    let track = Track {
        index,
        controls: Arc::clone(&controls),
        generator: None,
        incoming: swap_rx,
        retired: retire_tx,
    };
    let handle = TrackHandle {
        index,
        controls,
        outgoing: swap_tx,
        retired: retire_rx,
        params: None,
        generator_name: None,
        config: config.clone(),
    };
    (track, handle)
}

impl TrackHandle {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn controls(&self) -> &TrackControls {
        &self.controls
    }

    pub fn name(&self) -> &str {
        self.controls.name()
    }

    /// Replace the track's generator (or remove it with `None`).
    ///
    /// The generator is prepared here, on the control path. It reaches the
    /// render side at the start of the next block.
    pub fn set_generator(&mut self, generator: Option<Box<dyn SoundGenerator>>) -> Result<()> {
        self.collect_garbage();

        if self.outgoing.is_full() {
            return Err(EngineError::QueueFull {
                queue: "generator swap",
            });
        }

        let mut generator = generator;
        if let Some(generator) = generator.as_mut() {
            generator.prepare(&self.config);
        }
        let params = generator.as_ref().and_then(|g| g.parameters());
        let name = generator.as_ref().map(|g| g.name());

        if self.outgoing.push(generator).is_err() {
            return Err(EngineError::QueueFull {
                queue: "generator swap",
            });
        }

        debug!(track = self.index, generator = ?name, "generator queued");
        self.params = params;
        self.generator_name = name;
        Ok(())
    }

    /// Drop generators the render side has swapped out. Returns how many.
    pub fn collect_garbage(&mut self) -> usize {
        let mut collected = 0;
        while let Ok(mut generator) = self.retired.pop() {
            generator.release_resources();
            debug!(track = self.index, generator = generator.name(), "generator retired");
            collected += 1;
        }
        collected
    }

    /// Parameter block of the most recently queued generator.
    pub fn params(&self) -> Option<&Arc<SynthParams>> {
        self.params.as_ref()
    }

    pub fn generator_name(&self) -> Option<&'static str> {
        self.generator_name
    }

    pub fn summary(&self) -> TrackSummary {
        TrackSummary {
            index: self.index,
            name: self.controls.name().to_owned(),
            volume: self.controls.volume(),
            pan: self.controls.pan(),
            muted: self.controls.is_muted(),
            soloed: self.controls.is_soloed(),
            has_generator: self.generator_name.is_some(),
            generator: self.generator_name.map(str::to_owned),
        }
    }
}
