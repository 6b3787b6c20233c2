//! The engine's control surface.
//!
//! [`ControlCommand`] is what the outside world (the TUI, a MIDI port, a
//! script) sends. [`RenderCommand`] is the much smaller set of messages that
//! actually cross into the audio thread; everything else is handled on the
//! control path.

use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::EngineError, synth::SynthMessage};

/// Synthesizer parameters addressable by name.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Cutoff,
    Resonance,
    /// Waveform index: 0 sine, 1 saw, 2 square, 3 triangle.
    Oscillator,
}

impl Parameter {
    pub const ALL: [Parameter; 3] = [Parameter::Cutoff, Parameter::Resonance, Parameter::Oscillator];

    pub fn name(self) -> &'static str {
        match self {
            Parameter::Cutoff => "cutoff",
            Parameter::Resonance => "resonance",
            Parameter::Oscillator => "oscillator",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Parameter {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cutoff" => Ok(Parameter::Cutoff),
            "resonance" | "res" | "q" => Ok(Parameter::Resonance),
            "oscillator" | "osc" | "waveform" => Ok(Parameter::Oscillator),
            _ => Err(EngineError::UnknownParameter(s.to_owned())),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportCommand {
    Play,
    Stop,
    Record(bool),
    SetBpm(f64),
    SetMetronome(bool),
}

/// Timeline edits from a piano-roll style editor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEdit {
    /// Place a one-beat note at velocity 0.8.
    Add { pitch: i32, beat: f64 },
    Remove { pitch: i32, beat: f64 },
    Clear,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum MixerCommand {
    Mute(usize, bool),
    Solo(usize, bool),
    SetVolume(usize, f32),
    SetPan(usize, f32),
    SelectTrack(usize),
    /// Append an instrument track running the built-in synthesizer.
    AddTrack(String),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    NoteOn { pitch: i32, velocity: f32 },
    NoteOff { pitch: i32 },
    SetParameter { name: Parameter, value: f32 },
    Transport(TransportCommand),
    EditNote(NoteEdit),
    Mixer(MixerCommand),
}

/// Messages the audio thread consumes at the start of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum RenderCommand {
    Play,
    Stop,
    Record(bool),
    SetBpm(f64),
    SetMetronome(bool),
    SelectTrack(usize),
    Note { track: usize, message: SynthMessage },
    AllNotesOff,
}
