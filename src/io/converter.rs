use crate::{
    engine::command::{ControlCommand, Parameter},
    io::midi::MidiEvent,
};

/// CC 74 ("brightness") drives the filter cutoff.
pub const CC_CUTOFF: u8 = 74;
/// CC 71 ("harmonic content") drives the filter resonance.
pub const CC_RESONANCE: u8 = 71;

/// Translate a hardware MIDI event into an engine control command.
///
/// `channel_filter` of `None` accepts every channel. A note-on with zero
/// velocity is a note-off, as running-status keyboards send it.
pub fn midi_to_command(midi: MidiEvent, channel_filter: Option<u8>) -> Option<ControlCommand> {
    let accepts = |channel: u8| channel_filter.map_or(true, |c| c == channel);

    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if accepts(channel) => {
            if velocity == 0 {
                Some(ControlCommand::NoteOff { pitch: key as i32 })
            } else {
                Some(ControlCommand::NoteOn {
                    pitch: key as i32,
                    velocity: velocity as f32 / 127.0,
                })
            }
        }
        MidiEvent::NoteOff { channel, key, .. } if accepts(channel) => {
            Some(ControlCommand::NoteOff { pitch: key as i32 })
        }
        MidiEvent::ControlChange {
            channel,
            controller,
            value,
        } if accepts(channel) => {
            let amount = value as f32 / 127.0;
            match controller {
                // Exponential sweep so the lower register gets as much travel as the top.
                CC_CUTOFF => Some(ControlCommand::SetParameter {
                    name: Parameter::Cutoff,
                    value: 20.0 * 1000.0_f32.powf(amount),
                }),
                CC_RESONANCE => Some(ControlCommand::SetParameter {
                    name: Parameter::Resonance,
                    value: 0.1 + amount * 19.9,
                }),
                _ => None,
            }
        }
        MidiEvent::ProgramChange { channel, program } if accepts(channel) => {
            Some(ControlCommand::SetParameter {
                name: Parameter::Oscillator,
                value: (program % 4) as f32,
            })
        }
        _ => None,
    }
}

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Scientific pitch name, middle C (60) being "C4".
pub fn midi_note_name(note: u8) -> String {
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[note as usize % 12], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_names() {
        assert_eq!(midi_note_name(60), "C4");
        assert_eq!(midi_note_name(69), "A4");
        assert_eq!(midi_note_name(0), "C-1");
        assert_eq!(midi_note_name(127), "G9");
    }

    #[test]
    fn a4_is_440() {
        assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_note_to_freq(81) - 880.0).abs() < 1e-2);
    }

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        let cmd = midi_to_command(
            MidiEvent::NoteOn {
                channel: 0,
                key: 64,
                velocity: 0,
            },
            None,
        );
        assert_eq!(cmd, Some(ControlCommand::NoteOff { pitch: 64 }));
    }

    #[test]
    fn channel_filter_drops_other_channels() {
        let event = MidiEvent::NoteOn {
            channel: 3,
            key: 60,
            velocity: 100,
        };
        assert_eq!(midi_to_command(event, Some(0)), None);
        assert!(midi_to_command(event, Some(3)).is_some());
    }

    #[test]
    fn cutoff_cc_spans_audible_range() {
        let low = midi_to_command(
            MidiEvent::ControlChange {
                channel: 0,
                controller: CC_CUTOFF,
                value: 0,
            },
            None,
        );
        let high = midi_to_command(
            MidiEvent::ControlChange {
                channel: 0,
                controller: CC_CUTOFF,
                value: 127,
            },
            None,
        );

        match (low, high) {
            (
                Some(ControlCommand::SetParameter { value: lo, .. }),
                Some(ControlCommand::SetParameter { value: hi, .. }),
            ) => {
                assert!((lo - 20.0).abs() < 1e-3);
                assert!((hi - 20_000.0).abs() < 1.0);
            }
            other => panic!("unexpected conversion: {other:?}"),
        }
    }
}
