//! Synthesis parameters shared between the control path and the voices.
//!
//! Each field is its own relaxed atomic. There is no cross-field consistency:
//! a block may render with a new cutoff and an old resonance, which is at most
//! one block of staleness and never a torn value.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::dsp::{
    filter::{MAX_CUTOFF, MAX_RESONANCE, MIN_CUTOFF, MIN_RESONANCE},
    Waveform,
};

pub const DEFAULT_CUTOFF: f32 = 5_000.0;
pub const DEFAULT_RESONANCE: f32 = 0.707;

#[derive(Debug)]
pub struct SynthParams {
    waveform: AtomicU8,
    cutoff: AtomicU32,
    resonance: AtomicU32,
}

/// One block's worth of parameter values, read once by the render path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceParams {
    pub waveform: Waveform,
    pub cutoff: f32,
    pub resonance: f32,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            waveform: AtomicU8::new(Waveform::default().index()),
            cutoff: AtomicU32::new(DEFAULT_CUTOFF.to_bits()),
            resonance: AtomicU32::new(DEFAULT_RESONANCE.to_bits()),
        }
    }
}

impl SynthParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform.index(), Ordering::Relaxed);
    }

    pub fn set_cutoff(&self, hz: f32) {
        let hz = if hz.is_nan() { DEFAULT_CUTOFF } else { hz };
        self.cutoff
            .store(hz.clamp(MIN_CUTOFF, MAX_CUTOFF).to_bits(), Ordering::Relaxed);
    }

    pub fn set_resonance(&self, q: f32) {
        let q = if q.is_nan() { DEFAULT_RESONANCE } else { q };
        self.resonance
            .store(q.clamp(MIN_RESONANCE, MAX_RESONANCE).to_bits(), Ordering::Relaxed);
    }

    pub fn waveform(&self) -> Waveform {
        Waveform::from_index(self.waveform.load(Ordering::Relaxed) as i32)
    }

    pub fn cutoff(&self) -> f32 {
        f32::from_bits(self.cutoff.load(Ordering::Relaxed))
    }

    pub fn resonance(&self) -> f32 {
        f32::from_bits(self.resonance.load(Ordering::Relaxed))
    }

    pub fn snapshot(&self) -> VoiceParams {
        VoiceParams {
            waveform: self.waveform(),
            cutoff: self.cutoff(),
            resonance: self.resonance(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_clamp_into_range() {
        let params = SynthParams::new();
        params.set_cutoff(5.0);
        params.set_resonance(500.0);
        assert_eq!(params.cutoff(), MIN_CUTOFF);
        assert_eq!(params.resonance(), MAX_RESONANCE);

        params.set_cutoff(f32::NAN);
        assert_eq!(params.cutoff(), DEFAULT_CUTOFF);
    }

    #[test]
    fn snapshot_reflects_latest_writes() {
        let params = SynthParams::new();
        params.set_waveform(Waveform::Triangle);
        params.set_cutoff(800.0);

        let snap = params.snapshot();
        assert_eq!(snap.waveform, Waveform::Triangle);
        assert_eq!(snap.cutoff, 800.0);
        assert_eq!(snap.resonance, DEFAULT_RESONANCE);
    }
}
