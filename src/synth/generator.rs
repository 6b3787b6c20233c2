use std::sync::Arc;

use crate::{
    config::EngineConfig,
    io::AudioBuffer,
    synth::{message::SynthMessage, params::SynthParams},
};

/// A sound source a track can play.
///
/// `prepare` and `release_resources` run on the control path and may
/// allocate. Everything else is called from the render path and must not
/// allocate, block or panic.
pub trait SoundGenerator: Send {
    /// Size internal state for the engine configuration.
    fn prepare(&mut self, _config: &EngineConfig) {}

    /// Add this block's output into `out`. Generators mix, they never
    /// overwrite.
    fn render(&mut self, out: &mut AudioBuffer);

    fn note_on(&mut self, note: u8, velocity: f32);

    fn note_off(&mut self, note: u8, allow_tail: bool);

    /// Silence everything immediately.
    fn all_notes_off(&mut self);

    /// Give back anything acquired in `prepare`.
    fn release_resources(&mut self) {}

    /// Parameter block the control path can adjust, if this generator has one.
    fn parameters(&self) -> Option<Arc<SynthParams>> {
        None
    }

    /// Display name for track summaries.
    fn name(&self) -> &'static str;

    fn handle(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
            SynthMessage::NoteOff { note, allow_tail } => self.note_off(note, allow_tail),
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }
}

/// Allow boxed generators to be used as generators (for dynamic dispatch)
impl SoundGenerator for Box<dyn SoundGenerator> {
    fn prepare(&mut self, config: &EngineConfig) {
        (**self).prepare(config)
    }

    fn render(&mut self, out: &mut AudioBuffer) {
        (**self).render(out)
    }

    fn note_on(&mut self, note: u8, velocity: f32) {
        (**self).note_on(note, velocity)
    }

    fn note_off(&mut self, note: u8, allow_tail: bool) {
        (**self).note_off(note, allow_tail)
    }

    fn all_notes_off(&mut self) {
        (**self).all_notes_off()
    }

    fn release_resources(&mut self) {
        (**self).release_resources()
    }

    fn parameters(&self) -> Option<Arc<SynthParams>> {
        (**self).parameters()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
