//! Fixed-size voice pool.
//!
//! Voice assignment is deterministic:
//!
//! 1. the first free voice in pool order;
//! 2. otherwise the releasing voice closest to silence (lowest envelope
//!    level, ties go to the lower index);
//! 3. otherwise the oldest-triggered voice.
//!
//! A note-on is never dropped: when the pool is exhausted somebody gets
//! stolen.

use std::sync::Arc;

use crate::{
    config::EngineConfig,
    io::AudioBuffer,
    synth::{
        generator::SoundGenerator,
        params::SynthParams,
        voice::{Voice, VoiceState},
    },
    MAX_BLOCK_SIZE,
};

pub struct Synthesizer {
    voices: Vec<Voice>,
    params: Arc<SynthParams>,
    mono: Vec<f32>,
    trigger_counter: u64,
}

impl Synthesizer {
    pub fn new(sample_rate: f32, max_voices: usize) -> Self {
        Self {
            voices: (0..max_voices.max(1))
                .map(|_| Voice::new(sample_rate))
                .collect(),
            params: Arc::new(SynthParams::new()),
            mono: vec![0.0; MAX_BLOCK_SIZE],
            trigger_counter: 0,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.sample_rate, config.max_voices)
    }

    /// Share an existing parameter block (e.g. when replacing a synth but
    /// keeping its sound).
    pub fn with_params(mut self, params: Arc<SynthParams>) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &Arc<SynthParams> {
        &self.params
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Index of the voice the next note-on will use.
    pub fn next_voice_index(&self) -> usize {
        if let Some(idx) = self.voices.iter().position(|v| v.is_free()) {
            return idx;
        }

        let releasing = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.state() == VoiceState::Releasing)
            .min_by(|(_, a), (_, b)| a.level().total_cmp(&b.level()))
            .map(|(idx, _)| idx);
        if let Some(idx) = releasing {
            return idx;
        }

        self.voices
            .iter()
            .enumerate()
            .min_by_key(|(_, v)| v.age())
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    }
}

impl SoundGenerator for Synthesizer {
    fn prepare(&mut self, config: &EngineConfig) {
        if self.voices.len() != config.max_voices.max(1) {
            self.voices = (0..config.max_voices.max(1))
                .map(|_| Voice::new(config.sample_rate))
                .collect();
        } else {
            for voice in &mut self.voices {
                *voice = Voice::new(config.sample_rate);
            }
        }
    }

    fn render(&mut self, out: &mut AudioBuffer) {
        let frames = out.frames().min(self.mono.len());
        let params = self.params.snapshot();
        let mono = &mut self.mono[..frames];
        mono.fill(0.0);

        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.render(mono, params);
        }

        out.add_mono(mono);
    }

    fn note_on(&mut self, note: u8, velocity: f32) {
        let idx = self.next_voice_index();
        let age = self.trigger_counter;
        self.trigger_counter += 1;
        self.voices[idx].start(note.min(127), velocity.clamp(0.0, 1.0), age);
    }

    fn note_off(&mut self, note: u8, allow_tail: bool) {
        for voice in self
            .voices
            .iter_mut()
            .filter(|v| v.note() == Some(note) && v.state() == VoiceState::Active)
        {
            voice.release(allow_tail);
        }
        if !allow_tail {
            // Also cut tails that are already fading.
            for voice in self.voices.iter_mut().filter(|v| v.note() == Some(note)) {
                voice.free();
            }
        }
    }

    fn all_notes_off(&mut self) {
        for voice in &mut self.voices {
            voice.free();
        }
    }

    fn parameters(&self) -> Option<Arc<SynthParams>> {
        Some(Arc::clone(&self.params))
    }

    fn name(&self) -> &'static str {
        "Internal Synth"
    }
}
