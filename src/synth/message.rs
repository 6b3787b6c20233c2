/// Note traffic delivered to a sound generator.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn { note: u8, velocity: f32 },
    /// `allow_tail: false` cuts the note without a release.
    NoteOff { note: u8, allow_tail: bool },
    AllNotesOff,
}
