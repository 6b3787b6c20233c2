use std::f32::consts::PI;

/*
Resonant Low-Pass (state-variable, trapezoidal integration)
===========================================================

Two integrators in a loop. Each sample solves the loop implicitly, which keeps
the filter stable right up to very high resonance and lets the cutoff move
every block without zipper artefacts.

  g = tan(π · cutoff / sample_rate)   pre-warped integrator gain
  k = 1 / Q                           damping; small k = sharp peak

  v3 = x - ic2
  v1 = (ic1 + g·v3) / (1 + g·(g + k))     band-pass
  v2 = ic2 + g·v1                          low-pass
  ic1 = 2·v1 - ic1
  ic2 = 2·v2 - ic2

Q = 0.707 is the flat Butterworth response. Q = 0.1 is heavily damped, Q = 20
rings loudly at the cutoff.

The cutoff is limited to just below Nyquist: tan() blows up at π/2.
*/

pub const MIN_CUTOFF: f32 = 20.0;
pub const MAX_CUTOFF: f32 = 20_000.0;
pub const MIN_RESONANCE: f32 = 0.1;
pub const MAX_RESONANCE: f32 = 20.0;

#[derive(Debug, Clone)]
pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    resonance: f32,

    // Coefficients cached for the current cutoff/resonance/sample rate.
    g: f32,
    k: f32,
    h: f32,
}

impl SVFilter {
    pub fn lowpass(cutoff_hz: f32, resonance: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: MAX_CUTOFF,
            resonance: 0.707,
            g: 0.0,
            k: 0.0,
            h: 0.0,
        };
        filter.set_params(cutoff_hz, resonance, sample_rate);
        filter
    }

    /// Update cutoff (Hz) and resonance (Q), recomputing coefficients only
    /// when something changed.
    pub fn set_params(&mut self, cutoff_hz: f32, resonance: f32, sample_rate: f32) {
        let nyquist_guard = sample_rate * 0.49;
        let cutoff = cutoff_hz.clamp(MIN_CUTOFF, MAX_CUTOFF).min(nyquist_guard);
        let resonance = resonance.clamp(MIN_RESONANCE, MAX_RESONANCE);

        if cutoff == self.cutoff_hz && resonance == self.resonance && self.h != 0.0 {
            return;
        }

        self.cutoff_hz = cutoff;
        self.resonance = resonance;
        self.g = (PI * cutoff / sample_rate).tan();
        self.k = 1.0 / resonance;
        self.h = 1.0 / (1.0 + self.g * (self.g + self.k));
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> f32 {
        let v3 = sample - self.ic2eq;
        let v1 = self.h * (self.ic1eq + self.g * v3);
        let v2 = self.ic2eq + self.g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        v2
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(256);
        buffer[skip..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (TAU * freq * n as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    #[test]
    fn passes_dc() {
        let mut filter = SVFilter::lowpass(500.0, 0.707, SAMPLE_RATE);
        let mut buffer = vec![1.0; 1024];
        filter.render(&mut buffer);
        assert!(buffer[1023] > 0.99);
    }

    #[test]
    fn attenuates_above_cutoff() {
        let mut filter = SVFilter::lowpass(500.0, 0.707, SAMPLE_RATE);
        let mut buffer = sine(5_000.0, 2048);
        filter.render(&mut buffer);

        // Two poles: about 40 dB down a decade above the cutoff.
        assert!(peak_after_transient(&buffer) < 0.05);
    }

    #[test]
    fn resonance_boosts_the_cutoff_frequency() {
        let mut flat = SVFilter::lowpass(1_000.0, 0.707, SAMPLE_RATE);
        let mut peaky = SVFilter::lowpass(1_000.0, 10.0, SAMPLE_RATE);

        let mut a = sine(1_000.0, 4096);
        let mut b = a.clone();
        flat.render(&mut a);
        peaky.render(&mut b);

        assert!(peak_after_transient(&b) > 3.0 * peak_after_transient(&a));
    }

    #[test]
    fn params_are_clamped() {
        let filter = SVFilter::lowpass(1.0e9, 1_000.0, SAMPLE_RATE);
        assert!(filter.cutoff() < SAMPLE_RATE / 2.0);
        assert_eq!(filter.resonance(), MAX_RESONANCE);

        let filter = SVFilter::lowpass(-5.0, 0.0, SAMPLE_RATE);
        assert_eq!(filter.cutoff(), MIN_CUTOFF);
        assert_eq!(filter.resonance(), MIN_RESONANCE);
    }
}
