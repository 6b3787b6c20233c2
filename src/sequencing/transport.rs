//! Transport - the tempo clock
//!
//! Tracks a fractional beat position inside a fixed-length loop. The render
//! path advances it once per block; the position wraps back to zero when it
//! reaches the loop length.

use crate::LOOP_LENGTH_BEATS;

pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 300.0;
pub const DEFAULT_BPM: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Stopped,
    Playing,
    /// Playing while capturing live notes into the timeline.
    Recording,
}

#[derive(Debug, Clone)]
pub struct Transport {
    /// Tempo in beats per minute
    bpm: f64,
    /// Current position in beats, always in `[0, loop_length)`
    beat_position: f64,
    playing: bool,
    recording: bool,
    loop_length: f64,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport {
    pub fn new() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            beat_position: 0.0,
            playing: false,
            recording: false,
            loop_length: LOOP_LENGTH_BEATS,
        }
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stop playback, rewind to the top of the loop and drop out of record.
    pub fn stop(&mut self) {
        self.playing = false;
        self.recording = false;
        self.beat_position = 0.0;
    }

    /// Recording implies playing. Leaving record keeps playing from where
    /// we are.
    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
        if recording {
            self.playing = true;
        }
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.bpm = if bpm.is_nan() {
            DEFAULT_BPM
        } else {
            bpm.clamp(MIN_BPM, MAX_BPM)
        };
    }

    /// Move the clock forward by `num_samples`.
    ///
    /// A single wrap is enough: a block is always far shorter than the loop.
    pub fn advance(&mut self, num_samples: usize, sample_rate: f64) {
        if !self.playing {
            return;
        }

        self.beat_position += num_samples as f64 * self.bpm / (60.0 * sample_rate);

        if self.beat_position >= self.loop_length {
            self.beat_position -= self.loop_length;
        }
    }

    pub fn state(&self) -> TransportState {
        match (self.playing, self.recording) {
            (true, true) => TransportState::Recording,
            (true, false) => TransportState::Playing,
            _ => TransportState::Stopped,
        }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn beat_position(&self) -> f64 {
        self.beat_position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn loop_length(&self) -> f64 {
        self.loop_length
    }
}
