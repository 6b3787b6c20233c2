//! Track mixer.
//!
//! The track list is append-only. The control side builds each track and
//! sends its render half over an SPSC queue; the render side adopts new
//! tracks at the start of a block into a vector reserved for `max_tracks`
//! entries, then publishes the live count.
//!
//! Solo and mute follow the usual desk rules: when any track is soloed only
//! soloed tracks are heard, and a muted track is never heard, soloed or not.
//! Tracks that are not heard still get their note events.

pub mod track;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::info;

use crate::{
    config::EngineConfig,
    error::{EngineError, Result},
    io::AudioBuffer,
    sequencing::EventList,
    synth::SoundGenerator,
};

pub use track::{Track, TrackControls, TrackHandle, TrackSummary};

/// Render half of the mixer.
pub struct Mixer {
    tracks: Vec<Track>,
    incoming: Consumer<Track>,
    live: Arc<AtomicUsize>,
    scratch: AudioBuffer,
}

/// Control half of the mixer.
pub struct MixerHandle {
    tracks: Vec<TrackHandle>,
    outgoing: Producer<Track>,
    live: Arc<AtomicUsize>,
    config: EngineConfig,
}

/// Build both halves of an empty mixer.
pub fn mixer(config: &EngineConfig) -> (Mixer, MixerHandle) {
    let max_tracks = config.max_tracks.max(1);
    let (tx, rx) = RingBuffer::new(max_tracks);
    let live = Arc::new(AtomicUsize::new(0));

    let mixer = Mixer {
        tracks: Vec::with_capacity(max_tracks),
        incoming: rx,
        live: Arc::clone(&live),
        scratch: AudioBuffer::new(config.channels.max(1), config.block_size.max(1)),
    };
    let handle = MixerHandle {
        tracks: Vec::with_capacity(max_tracks),
        outgoing: tx,
        live,
        config: config.clone(),
    };
    (mixer, handle)
}

impl Mixer {
    /// Move tracks queued by the control side into the live list.
    pub fn adopt_tracks(&mut self) {
        let before = self.tracks.len();
        while self.tracks.len() < self.tracks.capacity() {
            let Ok(track) = self.incoming.pop() else {
                break;
            };
            self.tracks.push(track);
        }
        if self.tracks.len() != before {
            self.live.store(self.tracks.len(), Ordering::Release);
        }
    }

    /// Mix one block of every audible track into `out`.
    ///
    /// `out` is overwritten. The result is hard-clamped to `[-1, 1]`.
    /// Tracks still waiting in the queue are not heard until
    /// [`Mixer::adopt_tracks`] moves them in.
    pub fn process_block(&mut self, out: &mut AudioBuffer, events: &EventList) {
        out.clear();
        self.scratch.set_frames(out.frames());

        let any_soloed = self.tracks.iter().any(|t| t.controls().is_soloed());

        for track in &mut self.tracks {
            track.adopt_generator();

            let controls = track.controls();
            let silenced = controls.is_muted() || (any_soloed && !controls.is_soloed());
            if silenced {
                track.dispatch(events);
                continue;
            }

            track.process(&mut self.scratch, events);
            out.add_from(&self.scratch);
        }

        out.clamp_unit();
    }

    /// Hard-stop every generator on every track.
    pub fn all_notes_off(&mut self) {
        for track in &mut self.tracks {
            track.all_notes_off();
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

impl MixerHandle {
    /// Append an empty track. Returns its index.
    pub fn add_track(&mut self, name: impl Into<String>) -> Result<usize> {
        self.add_track_with(name, None)
    }

    /// Append a track that starts out with `generator`.
    pub fn add_track_with(
        &mut self,
        name: impl Into<String>,
        generator: Option<Box<dyn SoundGenerator>>,
    ) -> Result<usize> {
        let max = self.config.max_tracks.max(1);
        if self.tracks.len() >= max {
            return Err(EngineError::TrackLimit { max });
        }

        let index = self.tracks.len();
        let (track, mut handle) = track::track(index, name, &self.config);
        if generator.is_some() {
            handle.set_generator(generator)?;
        }

        if self.outgoing.push(track).is_err() {
            return Err(EngineError::QueueFull { queue: "track" });
        }

        info!(index, name = handle.name(), "track added");
        self.tracks.push(handle);
        Ok(index)
    }

    pub fn get_track(&self, index: usize) -> Result<&TrackHandle> {
        self.tracks.get(index).ok_or(EngineError::NoSuchTrack(index))
    }

    pub fn get_track_mut(&mut self, index: usize) -> Result<&mut TrackHandle> {
        self.tracks
            .get_mut(index)
            .ok_or(EngineError::NoSuchTrack(index))
    }

    /// Tracks created so far.
    pub fn num_tracks(&self) -> usize {
        self.tracks.len()
    }

    /// Tracks the render side has adopted.
    pub fn live_tracks(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    pub fn tracks(&self) -> &[TrackHandle] {
        &self.tracks
    }

    pub fn summaries(&self) -> Vec<TrackSummary> {
        self.tracks.iter().map(TrackHandle::summary).collect()
    }

    /// Drop retired generators on every track. Returns how many.
    pub fn collect_garbage(&mut self) -> usize {
        self.tracks.iter_mut().map(TrackHandle::collect_garbage).sum()
    }
}
