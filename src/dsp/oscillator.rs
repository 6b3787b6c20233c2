use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Phase Accumulator
=================

Every waveform here is a function of a single number: the phase, an angle in
[0, 2π). Each sample the phase moves forward by a fixed increment and wraps
back when it passes 2π:

    increment = frequency / sample_rate * 2π

At 440 Hz and 48 kHz the increment is about 0.0576 rad, so one cycle takes
roughly 109 samples.

Shapes from the phase
---------------------

  Sine      sin(phase)
  Saw       phase/π - 1            ramps -1 → +1 once per cycle
  Square    +1 below π, -1 above   odd harmonics, hollow
  Triangle  |ramp| folded          odd harmonics falling as 1/n², soft

None of these are band-limited. Saw and square alias audibly at high pitches;
the voice filter takes the worst of it off.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    Sine,
    #[default]
    Saw,
    Square,
    Triangle,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Saw,
        Waveform::Square,
        Waveform::Triangle,
    ];

    /// Map a control value onto a waveform. Out-of-range indices clamp to the
    /// nearest end of the list.
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.clamp(0, Self::ALL.len() as i32 - 1) as usize]
    }

    pub fn index(self) -> u8 {
        match self {
            Waveform::Sine => 0,
            Waveform::Saw => 1,
            Waveform::Square => 2,
            Waveform::Triangle => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Saw => "saw",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
        }
    }

    /// Evaluate the waveform at `phase` (radians, expected in `[0, 2π)`).
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => phase.sin(),
            Waveform::Saw => phase / PI - 1.0,
            Waveform::Square => {
                if phase < PI {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 2.0 * (phase / PI - 1.0).abs() - 1.0,
        }
    }
}

/// Phase accumulator driving one waveform.
#[derive(Debug, Clone, Default)]
pub struct Oscillator {
    phase: f32,
    increment: f32,
}

impl Oscillator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_frequency(&mut self, frequency: f32, sample_rate: f32) {
        self.increment = frequency / sample_rate * TAU;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn increment(&self) -> f32 {
        self.increment
    }

    /// Produce one sample and advance the phase.
    #[inline]
    pub fn next_sample(&mut self, waveform: Waveform) -> f32 {
        let value = waveform.sample(self.phase);
        self.phase += self.increment;
        if self.phase >= TAU {
            self.phase -= TAU;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let frequency = 440.0;
        let mut osc = Oscillator::new();
        osc.set_frequency(frequency, sample_rate);

        let buffer: Vec<f32> = (0..128).map(|_| osc.next_sample(Waveform::Sine)).collect();

        // sample n should be sin(2pi f n / sr)
        let n = 12;
        let expected = (TAU * frequency * n as f32 / sample_rate).sin();
        assert!((buffer[n] - expected).abs() < 1e-5);
    }

    #[test]
    fn shapes_hit_their_extremes() {
        assert_eq!(Waveform::Saw.sample(0.0), -1.0);
        assert!((Waveform::Saw.sample(TAU - 1e-6) - 1.0).abs() < 1e-5);
        assert_eq!(Waveform::Square.sample(PI - 0.01), 1.0);
        assert_eq!(Waveform::Square.sample(PI + 0.01), -1.0);
        assert_eq!(Waveform::Triangle.sample(0.0), 1.0);
        assert!((Waveform::Triangle.sample(PI) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn every_shape_stays_in_unit_range() {
        let mut osc = Oscillator::new();
        osc.set_frequency(1234.5, 44_100.0);
        for waveform in Waveform::ALL {
            for _ in 0..2048 {
                let s = osc.next_sample(waveform);
                assert!((-1.0..=1.0).contains(&s), "{waveform:?} produced {s}");
            }
        }
    }

    #[test]
    fn from_index_clamps() {
        assert_eq!(Waveform::from_index(-3), Waveform::Sine);
        assert_eq!(Waveform::from_index(2), Waveform::Square);
        assert_eq!(Waveform::from_index(99), Waveform::Triangle);
    }
}
