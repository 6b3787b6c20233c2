use crate::{
    dsp::{Envelope, EnvelopeState, Oscillator, SVFilter},
    io::converter::midi_note_to_freq,
    synth::params::{VoiceParams, DEFAULT_CUTOFF, DEFAULT_RESONANCE},
};

/// Headroom per voice: a full pool at full velocity stays near unity.
const VELOCITY_GAIN: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Free,      // Available for allocation
    Active,    // Playing, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release phase
}

/// One oscillator, envelope and low-pass filter: the unit of polyphony.
#[derive(Debug, Clone)]
pub struct Voice {
    note: Option<u8>,
    velocity: f32,
    gain: f32,
    age: u64,
    sample_rate: f32,
    osc: Oscillator,
    env: Envelope,
    filter: SVFilter,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_envelope(sample_rate, Envelope::default())
    }

    pub fn with_envelope(sample_rate: f32, env: Envelope) -> Self {
        Self {
            note: None,
            velocity: 0.0,
            gain: 0.0,
            age: 0,
            sample_rate,
            osc: Oscillator::new(),
            env,
            filter: SVFilter::lowpass(DEFAULT_CUTOFF, DEFAULT_RESONANCE, sample_rate),
        }
    }

    /// Begin a note. `age` is the pool's trigger counter, used to find the
    /// oldest voice when stealing.
    pub fn start(&mut self, note: u8, velocity: f32, age: u64) {
        self.note = Some(note);
        self.velocity = velocity;
        self.gain = velocity * VELOCITY_GAIN;
        self.age = age;

        self.osc
            .set_frequency(midi_note_to_freq(note), self.sample_rate);
        self.osc.reset();
        self.filter.reset();
        self.env.note_on();
    }

    /// Enter the release stage, or stop dead when `allow_tail` is false.
    pub fn release(&mut self, allow_tail: bool) {
        if allow_tail {
            self.env.note_off(self.sample_rate);
        } else {
            self.free();
        }
    }

    /// Add this voice's output into `out` (mono).
    pub fn render(&mut self, out: &mut [f32], params: VoiceParams) {
        if !self.env.is_active() {
            return;
        }

        self.filter
            .set_params(params.cutoff, params.resonance, self.sample_rate);

        for sample in out.iter_mut() {
            let level = self.env.next_sample(self.sample_rate);
            let raw = self.osc.next_sample(params.waveform) * level * self.gain;
            *sample += self.filter.next_sample(raw);

            if !self.env.is_active() {
                break;
            }
        }

        // Release finished: hand the voice back to the pool.
        if !self.env.is_active() {
            self.free();
        }
    }

    pub fn free(&mut self) {
        self.env.reset();
        self.filter.reset();
        self.note = None;
        self.velocity = 0.0;
        self.gain = 0.0;
    }

    pub fn state(&self) -> VoiceState {
        match self.env.state() {
            EnvelopeState::Idle => VoiceState::Free,
            EnvelopeState::Release => VoiceState::Releasing,
            _ => VoiceState::Active,
        }
    }

    pub fn envelope_state(&self) -> EnvelopeState {
        self.env.state()
    }

    pub fn is_free(&self) -> bool {
        self.state() == VoiceState::Free
    }

    pub fn is_active(&self) -> bool {
        !self.is_free()
    }

    pub fn level(&self) -> f32 {
        self.env.level()
    }

    pub fn note(&self) -> Option<u8> {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    pub fn phase_increment(&self) -> f32 {
        self.osc.increment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::Waveform;
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn params() -> VoiceParams {
        VoiceParams {
            waveform: Waveform::Sine,
            cutoff: 20_000.0,
            resonance: 0.707,
        }
    }

    #[test]
    fn phase_increment_tracks_pitch() {
        let mut voice = Voice::new(SAMPLE_RATE);
        voice.start(69, 1.0, 0);
        let expected = 440.0 / SAMPLE_RATE * TAU;
        assert!((voice.phase_increment() - expected).abs() < 1e-6);
    }

    #[test]
    fn renders_additively() {
        let mut voice = Voice::new(SAMPLE_RATE);
        voice.start(60, 1.0, 0);

        let mut out = vec![0.5f32; 256];
        voice.render(&mut out, params());

        assert!(out.iter().any(|&s| (s - 0.5).abs() > 1e-4));
        // A quiet voice around an offset of 0.5 never goes far from it.
        assert!(out.iter().all(|&s| (s - 0.5).abs() <= VELOCITY_GAIN + 0.05));
    }

    #[test]
    fn release_completion_frees_the_voice() {
        let mut voice = Voice::with_envelope(SAMPLE_RATE, Envelope::adsr(0.001, 0.001, 0.5, 0.01));
        voice.start(60, 0.8, 0);

        let mut out = vec![0.0f32; 512];
        voice.render(&mut out, params());
        voice.release(true);
        assert_eq!(voice.state(), VoiceState::Releasing);

        // 10 ms release = 480 samples
        voice.render(&mut out, params());
        assert!(voice.is_free());
        assert_eq!(voice.note(), None);
    }

    #[test]
    fn hard_stop_skips_release() {
        let mut voice = Voice::new(SAMPLE_RATE);
        voice.start(60, 0.8, 0);
        voice.release(false);
        assert!(voice.is_free());

        let mut out = vec![0.0f32; 64];
        voice.render(&mut out, params());
        assert!(out.iter().all(|&s| s == 0.0));
    }
}
