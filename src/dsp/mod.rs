//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free and realtime-safe, so they sit
//! directly inside voice structs. They stay focused on the signal math; pool
//! management and parameter plumbing live in `synth`.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Resonant state-variable low-pass filter.
pub mod filter;
/// Phase-accumulating oscillator and its waveforms.
pub mod oscillator;

pub use envelope::{Envelope, EnvelopeState};
pub use filter::SVFilter;
pub use oscillator::{Oscillator, Waveform};
