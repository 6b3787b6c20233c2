//! Linear ADSR envelope.
//!
//! The level runs from 0 to 1 and scales the oscillator sample by sample.
//! Attack climbs to 1, decay falls to the sustain level, sustain holds until
//! `note_off`, and release falls to 0 before the envelope goes idle.
//!
//! Release always starts from the current level, so a note released halfway
//! through its attack fades from where it is. The release length is fixed in
//! samples when it begins and the ramp is interpolated, which lands exactly on
//! zero.

use crate::MIN_TIME;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    /// Silent; the owning voice is free.
    Idle,
    Attack,
    Decay,
    /// Held at the sustain level until note-off.
    Sustain,
    Release,
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,

    stage: EnvelopeState,
    level: f32,

    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::adsr(0.05, 0.1, 0.8, 0.5)
    }
}

impl Envelope {
    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),

            stage: EnvelopeState::Idle,
            level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Gate high: restart the attack from zero.
    ///
    /// Retriggering from zero keeps repeated notes distinct instead of
    /// smearing them together.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeState::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: start the release from the current level.
    pub fn note_off(&mut self, sample_rate: f32) {
        if matches!(self.stage, EnvelopeState::Idle | EnvelopeState::Release) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = (self.release_time * sample_rate).round().max(1.0) as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeState::Release;
    }

    /// Advance by one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            EnvelopeState::Idle => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level += 1.0 / (self.attack_time * sample_rate);

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.stage = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                let target = self.sustain_level;
                self.level -= (1.0 - target) / (self.decay_time * sample_rate);

                if self.level <= target {
                    self.level = target;
                    self.stage = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeState::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeState::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    /// Returns true while the envelope is producing output (not idle).
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeState::Idle)
    }

    /// Drop straight to idle, no release tail.
    pub fn reset(&mut self) {
        self.stage = EnvelopeState::Idle;
        self.level = 0.0;
        self.release_elapsed_samples = 0;
        self.release_start_level = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn state(&self) -> EnvelopeState {
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48_000.0;

    /// Run `seconds` of envelope and return the last level.
    fn run(env: &mut Envelope, seconds: f32) -> f32 {
        let mut level = env.level();
        for _ in 0..(seconds * SR).round() as usize {
            level = env.next_sample(SR);
        }
        level
    }

    #[test]
    fn default_shape_settles_on_sustain() {
        let mut env = Envelope::default();
        env.note_on();

        // 50 ms attack
        run(&mut env, 0.049);
        assert_eq!(env.state(), EnvelopeState::Attack);
        run(&mut env, 0.002);
        assert_eq!(env.state(), EnvelopeState::Decay);

        // plus 100 ms decay
        let level = run(&mut env, 0.11);
        assert_eq!(env.state(), EnvelopeState::Sustain);
        assert!((level - 0.8).abs() < 1e-6);

        // Sustain holds indefinitely.
        assert!((run(&mut env, 2.0) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn release_lands_on_zero_and_goes_idle() {
        let mut env = Envelope::default();
        env.note_on();
        run(&mut env, 0.5);

        env.note_off(SR);
        let halfway = run(&mut env, 0.25);
        assert!((halfway - 0.4).abs() < 1e-3, "linear fade from 0.8, got {halfway}");

        run(&mut env, 0.26);
        assert_eq!(env.level(), 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn early_release_fades_from_current_level() {
        let mut env = Envelope::default();
        env.note_on();
        let partial = run(&mut env, 0.01); // a fifth of the attack

        env.note_off(SR);
        let first = env.next_sample(SR);

        assert!(partial < 0.25);
        assert!(first <= partial + 1e-6, "release must not jump upwards");
        assert_eq!(env.state(), EnvelopeState::Release);
    }

    #[test]
    fn second_note_off_does_not_restart_release() {
        let mut env = Envelope::default();
        env.note_on();
        run(&mut env, 0.3);
        env.note_off(SR);
        let fading = run(&mut env, 0.1);

        env.note_off(SR);
        assert!(env.next_sample(SR) < fading);
    }

    #[test]
    fn note_off_while_idle_is_ignored() {
        let mut env = Envelope::default();
        env.note_off(SR);
        assert_eq!(env.state(), EnvelopeState::Idle);
    }

    #[test]
    fn retrigger_restarts_from_silence() {
        let mut env = Envelope::default();
        env.note_on();
        run(&mut env, 0.3);

        env.note_on();
        assert_eq!(env.level(), 0.0);
        assert_eq!(env.state(), EnvelopeState::Attack);
    }
}
