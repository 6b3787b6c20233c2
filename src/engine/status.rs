//! State the audio thread publishes back to the control path.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    mixer::TrackSummary,
    sequencing::{transport::DEFAULT_BPM, NoteEvent, TransportState},
};

/// Snapshot of the whole engine for one UI tick.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStatus {
    pub beat_position: f64,
    pub bpm: f64,
    pub playing: bool,
    pub recording: bool,
    pub metronome: bool,
    pub selected_track: usize,
    /// Peak of the most recent block, after the final clamp.
    pub peak: f32,
    pub loop_length: f64,
    pub notes: Vec<NoteEvent>,
    pub tracks: Vec<TrackSummary>,
}

impl EngineStatus {
    pub fn transport_state(&self) -> TransportState {
        match (self.playing, self.recording) {
            (true, true) => TransportState::Recording,
            (true, false) => TransportState::Playing,
            _ => TransportState::Stopped,
        }
    }
}

/// Written once per block by the render side, read freely by the control
/// side. Every field is independent; readers may see one block of skew.
#[derive(Debug)]
pub(crate) struct SharedState {
    beat_position: AtomicU64,
    bpm: AtomicU64,
    playing: AtomicBool,
    recording: AtomicBool,
    metronome: AtomicBool,
    selected_track: AtomicUsize,
    peak: AtomicU32,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            beat_position: AtomicU64::new(0.0f64.to_bits()),
            bpm: AtomicU64::new(DEFAULT_BPM.to_bits()),
            playing: AtomicBool::new(false),
            recording: AtomicBool::new(false),
            metronome: AtomicBool::new(false),
            selected_track: AtomicUsize::new(0),
            peak: AtomicU32::new(0.0f32.to_bits()),
        }
    }
}

impl SharedState {
    pub fn publish_transport(&self, beat: f64, bpm: f64, playing: bool, recording: bool) {
        self.beat_position.store(beat.to_bits(), Ordering::Relaxed);
        self.bpm.store(bpm.to_bits(), Ordering::Relaxed);
        self.playing.store(playing, Ordering::Relaxed);
        self.recording.store(recording, Ordering::Relaxed);
    }

    pub fn publish_metronome(&self, enabled: bool) {
        self.metronome.store(enabled, Ordering::Relaxed);
    }

    pub fn publish_selected(&self, track: usize) {
        self.selected_track.store(track, Ordering::Relaxed);
    }

    pub fn publish_peak(&self, peak: f32) {
        self.peak.store(peak.to_bits(), Ordering::Relaxed);
    }

    pub fn beat_position(&self) -> f64 {
        f64::from_bits(self.beat_position.load(Ordering::Relaxed))
    }

    pub fn bpm(&self) -> f64 {
        f64::from_bits(self.bpm.load(Ordering::Relaxed))
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Relaxed)
    }

    pub fn metronome(&self) -> bool {
        self.metronome.load(Ordering::Relaxed)
    }

    pub fn selected_track(&self) -> usize {
        self.selected_track.load(Ordering::Relaxed)
    }

    pub fn peak(&self) -> f32 {
        f32::from_bits(self.peak.load(Ordering::Relaxed))
    }
}
