//! Click track.
//!
//! A metronome plays fixed frequencies rather than MIDI notes: a bright sine
//! blip with a near-instant attack and no sustain. The downbeat of each bar
//! gets a higher, louder click.

use crate::{
    dsp::{Envelope, EnvelopeState, Oscillator, Waveform},
    io::AudioBuffer,
    MAX_BLOCK_SIZE,
};

const ACCENT_HZ: f32 = 2_000.0;
const BEAT_HZ: f32 = 1_200.0;
const ACCENT_GAIN: f32 = 0.5;
const BEAT_GAIN: f32 = 0.3;

pub struct Metronome {
    sample_rate: f32,
    osc: Oscillator,
    env: Envelope,
    gain: f32,
    mono: Vec<f32>,
}

impl Metronome {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            osc: Oscillator::new(),
            env: Envelope::adsr(0.001, 0.03, 0.0, 0.01),
            gain: 0.0,
            mono: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn trigger(&mut self, accent: bool) {
        let (freq, gain) = if accent {
            (ACCENT_HZ, ACCENT_GAIN)
        } else {
            (BEAT_HZ, BEAT_GAIN)
        };
        self.osc.set_frequency(freq, self.sample_rate);
        self.osc.reset();
        self.gain = gain;
        self.env.note_on();
    }

    pub fn is_active(&self) -> bool {
        self.env.is_active()
    }

    /// Add the click (if one is sounding) into every channel of `out`.
    pub fn render(&mut self, out: &mut AudioBuffer) {
        if !self.env.is_active() {
            return;
        }

        let frames = out.frames().min(self.mono.len());
        let mono = &mut self.mono[..frames];
        for sample in mono.iter_mut() {
            let level = self.env.next_sample(self.sample_rate);
            *sample = self.osc.next_sample(Waveform::Sine) * level * self.gain;
        }
        out.add_mono(mono);

        // No sustain: the click is over once the decay bottoms out.
        if self.env.state() == EnvelopeState::Sustain {
            self.env.reset();
        }
    }

    pub fn reset(&mut self) {
        self.env.reset();
    }
}
