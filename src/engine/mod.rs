//! Engine assembly.
//!
//! [`Engine::new`] wires every component together and splits the result in
//! two:
//!
//! - [`Engine`] belongs to the audio callback. It never allocates, blocks or
//!   frees; it drains queued commands, runs the sequencer, mixes the tracks
//!   and adds the click.
//! - [`EngineHandle`] belongs to everything else (UI, MIDI input). It edits
//!   the timeline, manages tracks, sets parameters and reads status.
//!
//! # Example
//!
//! ```
//! use loopstation::{io::AudioBuffer, Engine, EngineConfig};
//!
//! let (mut engine, mut handle) = Engine::new(EngineConfig::default());
//! handle.note_on(60, 0.9).unwrap();
//!
//! let mut block = AudioBuffer::new(2, 512);
//! engine.process_block(&mut block);
//! handle.maintain();
//! ```

pub mod command;
pub mod status;

use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{info, warn};

use crate::{
    config::EngineConfig,
    dsp::Waveform,
    error::{EngineError, Result},
    io::AudioBuffer,
    logging::{self, LogDrain, RtEvent, RtLogger},
    mixer::{self, Mixer, MixerHandle, TrackHandle},
    sequencing::{
        EventList, NoteEvent, NoteTimeline, SequencerBridge, SnapshotStatus, Transport,
    },
    synth::{metronome::Metronome, SoundGenerator, SynthMessage, Synthesizer},
};

use self::{
    command::{ControlCommand, MixerCommand, NoteEdit, Parameter, RenderCommand, TransportCommand},
    status::{EngineStatus, SharedState},
};

/// Velocity of notes placed with the editor.
pub const EDIT_VELOCITY: f32 = 0.8;
/// Length of notes placed with the editor, in beats.
pub const EDIT_DURATION: f64 = 1.0;

/// Render half of the engine.
pub struct Engine {
    core: EngineCore,
    block: AudioBuffer,
}

struct EngineCore {
    config: EngineConfig,
    transport: Transport,
    timeline: Arc<NoteTimeline>,
    bridge: SequencerBridge,
    mixer: Mixer,
    metronome: Metronome,
    metronome_enabled: bool,
    selected_track: usize,
    events: EventList,
    commands: Consumer<RenderCommand>,
    shared: Arc<SharedState>,
    log: RtLogger,
    last_snapshot: SnapshotStatus,
    live_tracks: usize,
}

/// Control half of the engine.
pub struct EngineHandle {
    config: EngineConfig,
    commands: Producer<RenderCommand>,
    timeline: Arc<NoteTimeline>,
    mixer: MixerHandle,
    shared: Arc<SharedState>,
    log: LogDrain,
    selected_track: usize,
    recording: bool,
    /// Track each live pitch was started on, so its note-off follows it.
    held: [Option<usize>; 128],
}

impl Engine {
    /// Build an engine with one instrument track running the built-in synth.
    pub fn new(config: EngineConfig) -> (Engine, EngineHandle) {
        let config = config.validated();

        let (mixer, mixer_handle) = mixer::mixer(&config);
        let (command_tx, command_rx) = RingBuffer::new(config.command_capacity);
        let (log, drain) = logging::channel(config.log_capacity);
        let timeline = Arc::new(NoteTimeline::new());
        let shared = Arc::new(SharedState::default());

        let engine = Engine {
            core: EngineCore {
                transport: Transport::new(),
                timeline: Arc::clone(&timeline),
                bridge: SequencerBridge::new(config.timeline_capacity),
                mixer,
                metronome: Metronome::new(config.sample_rate),
                metronome_enabled: false,
                selected_track: 0,
                events: EventList::with_capacity(config.event_capacity + config.command_capacity),
                commands: command_rx,
                shared: Arc::clone(&shared),
                log,
                last_snapshot: SnapshotStatus::Fresh,
                live_tracks: 0,
                config: config.clone(),
            },
            block: AudioBuffer::new(config.channels, config.block_size),
        };

        let mut handle = EngineHandle {
            config,
            commands: command_tx,
            timeline,
            mixer: mixer_handle,
            shared,
            log: drain,
            selected_track: 0,
            recording: false,
            held: [None; 128],
        };
        if let Err(err) = handle.add_track("Synth 1") {
            warn!(%err, "could not create the default track");
        }

        info!(
            sample_rate = handle.config.sample_rate,
            block_size = handle.config.block_size,
            channels = handle.config.channels,
            "engine ready"
        );
        (engine, handle)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.core.config
    }

    /// Render one block into `out`, overwriting it.
    ///
    /// At most `block_size` frames are rendered; a longer buffer is shortened
    /// to that length.
    pub fn process_block(&mut self, out: &mut AudioBuffer) {
        self.core.process_block(out);
    }

    /// Fill an interleaved device buffer, splitting it into engine blocks.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        let block_samples = self.core.config.block_size * channels;
        for chunk in data.chunks_mut(block_samples) {
            chunk.fill(0.0);
            self.block.set_frames(chunk.len() / channels);
            self.core.process_block(&mut self.block);
            self.block.write_interleaved(chunk, channels);
        }
    }
}

impl EngineCore {
    fn process_block(&mut self, out: &mut AudioBuffer) {
        out.set_frames(out.frames().min(self.config.block_size));
        let frames = out.frames();
        self.events.clear();

        self.mixer.adopt_tracks();
        self.drain_commands();

        let report = self.bridge.process_block(
            &mut self.transport,
            &self.timeline,
            frames,
            self.config.sample_rate as f64,
            self.selected_track,
            &mut self.events,
        );

        if let Some(report) = report {
            if report.snapshot != self.last_snapshot {
                match report.snapshot {
                    SnapshotStatus::Busy => self.log.log(RtEvent::SnapshotBusy),
                    SnapshotStatus::Truncated => self.log.log(RtEvent::SnapshotTruncated {
                        capacity: self.config.timeline_capacity,
                    }),
                    SnapshotStatus::Fresh => {}
                }
                self.last_snapshot = report.snapshot;
            }

            if self.metronome_enabled {
                for beat in report.window.beat_ticks() {
                    self.metronome.trigger(beat % 4 == 0);
                }
            }
        }

        if self.events.dropped() > 0 {
            self.log.log(RtEvent::EventsDropped {
                count: self.events.dropped(),
            });
        }

        self.mixer.process_block(out, &self.events);

        let live = self.mixer.tracks().len();
        if live != self.live_tracks {
            self.live_tracks = live;
            self.log.log(RtEvent::TracksAdopted { count: live });
        }

        self.metronome.render(out);
        out.clamp_unit();

        self.shared.publish_transport(
            self.transport.beat_position(),
            self.transport.bpm(),
            self.transport.is_playing(),
            self.transport.is_recording(),
        );
        self.shared.publish_peak(out.peak());
    }

    fn drain_commands(&mut self) {
        for _ in 0..self.config.command_capacity {
            let Ok(command) = self.commands.pop() else {
                break;
            };
            self.apply(command);
        }
    }

    fn apply(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::Play => {
                self.transport.play();
                self.log_transport();
            }
            RenderCommand::Stop => {
                self.transport.stop();
                self.mixer.all_notes_off();
                self.metronome.reset();
                self.log_transport();
            }
            RenderCommand::Record(recording) => {
                self.transport.set_recording(recording);
                self.log_transport();
            }
            RenderCommand::SetBpm(bpm) => self.transport.set_bpm(bpm),
            RenderCommand::SetMetronome(enabled) => {
                self.metronome_enabled = enabled;
                if !enabled {
                    self.metronome.reset();
                }
                self.shared.publish_metronome(enabled);
            }
            RenderCommand::SelectTrack(track) => {
                if track != self.selected_track && self.transport.is_playing() {
                    self.bridge.release_held(
                        self.transport.beat_position(),
                        self.transport.loop_length(),
                        self.selected_track,
                        &mut self.events,
                    );
                }
                if track >= self.mixer.tracks().len() {
                    self.log.log(RtEvent::UnknownTrack { track });
                }
                self.selected_track = track;
                self.shared.publish_selected(track);
            }
            RenderCommand::Note { track, message } => {
                self.events.push(track, message);
            }
            RenderCommand::AllNotesOff => self.mixer.all_notes_off(),
        }
    }

    fn log_transport(&mut self) {
        self.log.log(RtEvent::TransportChanged {
            state: self.transport.state(),
            beat: self.transport.beat_position(),
        });
    }
}

impl EngineHandle {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply one command from the external control surface.
    pub fn apply(&mut self, command: ControlCommand) -> Result<()> {
        match command {
            ControlCommand::NoteOn { pitch, velocity } => self.note_on(pitch, velocity),
            ControlCommand::NoteOff { pitch } => self.note_off(pitch),
            ControlCommand::SetParameter { name, value } => self.set_parameter(name, value),
            ControlCommand::Transport(command) => match command {
                TransportCommand::Play => self.play(),
                TransportCommand::Stop => self.stop(),
                TransportCommand::Record(on) => self.set_recording(on),
                TransportCommand::SetBpm(bpm) => self.set_bpm(bpm),
                TransportCommand::SetMetronome(on) => self.set_metronome(on),
            },
            ControlCommand::EditNote(edit) => {
                match edit {
                    NoteEdit::Add { pitch, beat } => {
                        self.add_note(pitch, beat);
                    }
                    NoteEdit::Remove { pitch, beat } => {
                        self.remove_note(pitch, beat);
                    }
                    NoteEdit::Clear => self.clear_notes(),
                }
                Ok(())
            }
            ControlCommand::Mixer(command) => match command {
                MixerCommand::Mute(track, on) => self.set_muted(track, on),
                MixerCommand::Solo(track, on) => self.set_soloed(track, on),
                MixerCommand::SetVolume(track, volume) => self.set_volume(track, volume),
                MixerCommand::SetPan(track, pan) => self.set_pan(track, pan),
                MixerCommand::SelectTrack(track) => self.select_track(track),
                MixerCommand::AddTrack(name) => self.add_track(name).map(|_| ()),
            },
        }
    }

    fn send(&mut self, command: RenderCommand) -> Result<()> {
        self.commands
            .push(command)
            .map_err(|_| EngineError::QueueFull { queue: "command" })
    }

    // -- live notes -------------------------------------------------------

    /// Play a note on the selected track. While recording, the note is also
    /// captured into the timeline.
    pub fn note_on(&mut self, pitch: i32, velocity: f32) -> Result<()> {
        let note = pitch.clamp(0, 127) as u8;
        let velocity = if velocity.is_nan() { 0.0 } else { velocity.clamp(0.0, 1.0) };

        let track = self.selected_track;
        if let Some(previous) = self.held[note as usize].filter(|&t| t != track) {
            self.send(RenderCommand::Note {
                track: previous,
                message: SynthMessage::NoteOff {
                    note,
                    allow_tail: true,
                },
            })?;
        }

        self.send(RenderCommand::Note {
            track,
            message: SynthMessage::NoteOn { note, velocity },
        })?;
        self.held[note as usize] = Some(track);

        if self.recording {
            self.timeline
                .begin_capture(note, velocity, self.shared.beat_position());
        }
        Ok(())
    }

    /// Release a note on the track it was started on (the selected track if
    /// it is not held), committing its capture if one is open.
    pub fn note_off(&mut self, pitch: i32) -> Result<()> {
        let note = pitch.clamp(0, 127) as u8;

        if let Some(captured) = self.timeline.end_capture(note, self.shared.beat_position()) {
            info!(
                pitch = captured.pitch,
                start = captured.start_beat,
                duration = captured.duration_beats,
                "note recorded"
            );
        }
        let track = self.held[note as usize].unwrap_or(self.selected_track);
        self.send(RenderCommand::Note {
            track,
            message: SynthMessage::NoteOff {
                note,
                allow_tail: true,
            },
        })?;
        self.held[note as usize] = None;
        Ok(())
    }

    /// Hard-stop every note on every track.
    pub fn panic(&mut self) -> Result<()> {
        self.send(RenderCommand::AllNotesOff)?;
        self.held = [None; 128];
        Ok(())
    }

    // -- transport --------------------------------------------------------

    pub fn play(&mut self) -> Result<()> {
        self.send(RenderCommand::Play)
    }

    /// Stop, rewind and drop any capture still waiting for its note-off.
    pub fn stop(&mut self) -> Result<()> {
        self.send(RenderCommand::Stop)?;
        self.recording = false;
        self.held = [None; 128];
        let orphans = self.timeline.discard_pending();
        if orphans > 0 {
            info!(orphans, "discarded unfinished captures");
        }
        Ok(())
    }

    pub fn set_recording(&mut self, recording: bool) -> Result<()> {
        self.send(RenderCommand::Record(recording))?;
        self.recording = recording;
        Ok(())
    }

    pub fn set_bpm(&mut self, bpm: f64) -> Result<()> {
        self.send(RenderCommand::SetBpm(bpm))
    }

    pub fn set_metronome(&mut self, enabled: bool) -> Result<()> {
        self.send(RenderCommand::SetMetronome(enabled))
    }

    // -- timeline ---------------------------------------------------------

    /// Place an editor note at `beat` (wrapped into the loop).
    pub fn add_note(&mut self, pitch: i32, beat: f64) -> NoteEvent {
        let beat = if beat.is_finite() {
            beat.rem_euclid(self.timeline.loop_length())
        } else {
            0.0
        };
        self.timeline
            .add_note(NoteEvent::new(pitch, EDIT_VELOCITY, beat, EDIT_DURATION))
    }

    pub fn remove_note(&mut self, pitch: i32, beat: f64) -> usize {
        self.timeline.remove_note(pitch, beat)
    }

    pub fn clear_notes(&mut self) {
        self.timeline.clear();
    }

    pub fn timeline(&self) -> &Arc<NoteTimeline> {
        &self.timeline
    }

    // -- tracks -----------------------------------------------------------

    /// Append an instrument track running the built-in synthesizer.
    pub fn add_track(&mut self, name: impl Into<String>) -> Result<usize> {
        let synth = Synthesizer::from_config(&self.config);
        self.mixer.add_track_with(name, Some(Box::new(synth)))
    }

    /// Append a track with any generator, or none.
    pub fn add_track_with(
        &mut self,
        name: impl Into<String>,
        generator: Option<Box<dyn SoundGenerator>>,
    ) -> Result<usize> {
        self.mixer.add_track_with(name, generator)
    }

    pub fn set_generator(
        &mut self,
        track: usize,
        generator: Option<Box<dyn SoundGenerator>>,
    ) -> Result<()> {
        self.mixer.get_track_mut(track)?.set_generator(generator)
    }

    /// Route live notes and the sequencer to `track`.
    pub fn select_track(&mut self, track: usize) -> Result<()> {
        self.mixer.get_track(track)?;
        self.send(RenderCommand::SelectTrack(track))?;
        self.selected_track = track;
        Ok(())
    }

    pub fn selected_track(&self) -> usize {
        self.selected_track
    }

    pub fn set_muted(&mut self, track: usize, muted: bool) -> Result<()> {
        self.track(track)?.controls().set_muted(muted);
        Ok(())
    }

    pub fn set_soloed(&mut self, track: usize, soloed: bool) -> Result<()> {
        self.track(track)?.controls().set_soloed(soloed);
        Ok(())
    }

    pub fn set_volume(&mut self, track: usize, volume: f32) -> Result<()> {
        self.track(track)?.controls().set_volume(volume);
        Ok(())
    }

    pub fn set_pan(&mut self, track: usize, pan: f32) -> Result<()> {
        self.track(track)?.controls().set_pan(pan);
        Ok(())
    }

    pub fn track(&self, index: usize) -> Result<&TrackHandle> {
        self.mixer.get_track(index)
    }

    pub fn mixer(&self) -> &MixerHandle {
        &self.mixer
    }

    // -- parameters -------------------------------------------------------

    /// Adjust the synthesizer on the selected track. Values are clamped.
    pub fn set_parameter(&mut self, name: Parameter, value: f32) -> Result<()> {
        let track = self.selected_track;
        let params = self
            .mixer
            .get_track(track)?
            .params()
            .ok_or(EngineError::NoParameters(track))?;

        match name {
            Parameter::Cutoff => params.set_cutoff(value),
            Parameter::Resonance => params.set_resonance(value),
            Parameter::Oscillator => {
                let index = if value.is_finite() { value.round() as i32 } else { 0 };
                params.set_waveform(Waveform::from_index(index));
            }
        }
        Ok(())
    }

    /// `set_parameter` by name, for text-based control surfaces.
    pub fn set_parameter_by_name(&mut self, name: &str, value: f32) -> Result<()> {
        self.set_parameter(name.parse()?, value)
    }

    /// Current value of a parameter on the selected track.
    pub fn parameter(&self, name: Parameter) -> Result<f32> {
        let track = self.selected_track;
        let params = self
            .mixer
            .get_track(track)?
            .params()
            .ok_or(EngineError::NoParameters(track))?;

        Ok(match name {
            Parameter::Cutoff => params.cutoff(),
            Parameter::Resonance => params.resonance(),
            Parameter::Oscillator => params.waveform().index() as f32,
        })
    }

    // -- status & housekeeping ---------------------------------------------

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            beat_position: self.shared.beat_position(),
            bpm: self.shared.bpm(),
            playing: self.shared.is_playing(),
            recording: self.shared.is_recording(),
            metronome: self.shared.metronome(),
            selected_track: self.shared.selected_track(),
            peak: self.shared.peak(),
            loop_length: self.timeline.loop_length(),
            notes: self.timeline.snapshot(),
            tracks: self.mixer.summaries(),
        }
    }

    /// Control-path housekeeping: drop retired generators and forward
    /// realtime log records to `tracing`. Call this regularly, e.g. once
    /// per UI tick.
    pub fn maintain(&mut self) -> usize {
        let retired = self.mixer.collect_garbage();
        self.log.drain();
        retired
    }

    /// Realtime log records lost since startup.
    pub fn dropped_log_records(&self) -> u64 {
        self.log.dropped()
    }
}
