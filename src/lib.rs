//! Real-time loop station core: a polyphonic synthesizer, a 16-beat note
//! timeline with live recording, and a track mixer, split between a
//! lock-free render side and a control side.

pub mod config;
pub mod dsp;
pub mod engine; // Render/control split and the command surface
pub mod error;
pub mod io;
pub mod logging; // Realtime-safe log records
pub mod mixer;
pub mod sequencing; // Transport, timeline and per-block scheduling
pub mod synth; // Voice management and polyphony

pub use config::EngineConfig;
pub use engine::{
    command::{ControlCommand, MixerCommand, NoteEdit, Parameter, TransportCommand},
    status::EngineStatus,
    Engine, EngineHandle,
};
pub use error::{EngineError, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Length of the loop, in beats (four bars of 4/4).
pub const LOOP_LENGTH_BEATS: f64 = 16.0;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
