// Purpose: sound generation, voice management, polyphony
// This layer sits above the DSP primitives and below the mixer tracks.

pub mod generator;
pub mod message;
pub mod metronome;
pub mod params;
pub mod poly;
pub mod voice;

pub use generator::SoundGenerator;
pub use message::SynthMessage;
pub use params::SynthParams;
pub use poly::Synthesizer;
