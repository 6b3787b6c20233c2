#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: i16 },
    ProgramChange { channel: u8, program: u8 },
}

impl MidiEvent {
    /// Decode a raw channel-voice message (status byte plus data bytes).
    ///
    /// Returns `None` for system messages and truncated input.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = status & 0x0F;
        let byte = |i: usize| data.get(i).map(|b| b & 0x7F);

        match status & 0xF0 {
            0x80 => Some(Self::NoteOff {
                channel,
                key: byte(0)?,
                velocity: byte(1)?,
            }),
            0x90 => Some(Self::NoteOn {
                channel,
                key: byte(0)?,
                velocity: byte(1)?,
            }),
            0xB0 => Some(Self::ControlChange {
                channel,
                controller: byte(0)?,
                value: byte(1)?,
            }),
            0xC0 => Some(Self::ProgramChange {
                channel,
                program: byte(0)?,
            }),
            0xE0 => {
                let lsb = byte(0)? as i16;
                let msb = byte(1)? as i16;
                Some(Self::PitchBend {
                    channel,
                    value: ((msb << 7) | lsb) - 8192,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_note_on() {
        assert_eq!(
            MidiEvent::from_bytes(&[0x91, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 1,
                key: 60,
                velocity: 100
            })
        );
    }

    #[test]
    fn pitch_bend_is_centered() {
        assert_eq!(
            MidiEvent::from_bytes(&[0xE0, 0x00, 0x40]),
            Some(MidiEvent::PitchBend {
                channel: 0,
                value: 0
            })
        );
    }

    #[test]
    fn rejects_truncated_and_system_messages() {
        assert_eq!(MidiEvent::from_bytes(&[0x90, 60]), None);
        assert_eq!(MidiEvent::from_bytes(&[0xF8]), None);
        assert_eq!(MidiEvent::from_bytes(&[]), None);
    }
}
