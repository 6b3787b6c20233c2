//! UI state and key handling.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use rtrb::Consumer;
use tracing::warn;

use loopstation::{
    dsp::Waveform, EngineHandle, EngineStatus, Parameter, Result as EngineResult,
};

use crate::{audio::SCOPE_SIZE, ui};

/// Terminals only report key presses, so played notes are released after
/// this long.
const NOTE_HOLD: Duration = Duration::from_millis(300);
const BPM_STEP: f64 = 5.0;
const CUTOFF_RATIO: f32 = 1.25;
const RESONANCE_STEP: f32 = 0.5;
const PAN_STEP: f32 = 0.1;
const VOLUME_STEP: f32 = 0.1;

/// Piano row on the home keys, starting at C.
const PIANO_KEYS: [char; 13] = ['a', 'w', 's', 'e', 'd', 'f', 't', 'g', 'y', 'h', 'u', 'j', 'k'];

pub struct App {
    handle: EngineHandle,
    scope_rx: Consumer<f32>,
    pub scope: Vec<f32>,
    pub status: EngineStatus,
    /// Editor cursor, in beats.
    pub cursor_beat: f64,
    pub cursor_pitch: i32,
    pub octave: i32,
    pub message: Option<String>,
    held: Vec<(i32, Instant)>,
    should_quit: bool,
}

impl App {
    pub fn new(handle: EngineHandle, scope_rx: Consumer<f32>) -> Self {
        let status = handle.status();
        Self {
            handle,
            scope_rx,
            scope: vec![0.0; SCOPE_SIZE],
            status,
            cursor_beat: 0.0,
            cursor_pitch: 60,
            octave: 4,
            message: None,
            held: Vec::new(),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            self.handle.maintain();
            self.release_held_notes();
            self.poll_scope();
            self.status = self.handle.status();

            terminal.draw(|frame| ui::render(frame, self))?;

            // ~60 fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }

        let _ = self.handle.stop();
        Ok(())
    }

    fn poll_scope(&mut self) {
        while let Ok(sample) = self.scope_rx.pop() {
            self.scope.push(sample);
        }
        if self.scope.len() > SCOPE_SIZE {
            let excess = self.scope.len() - SCOPE_SIZE;
            self.scope.drain(0..excess);
        }
    }

    fn release_held_notes(&mut self) {
        let now = Instant::now();
        let mut expired = Vec::new();
        self.held.retain(|&(pitch, since)| {
            let keep = now.duration_since(since) < NOTE_HOLD;
            if !keep {
                expired.push(pitch);
            }
            keep
        });
        for pitch in expired {
            let result = self.handle.note_off(pitch);
            self.report(result);
        }
    }

    fn report(&mut self, result: EngineResult<()>) {
        if let Err(err) = result {
            warn!(%err, "command rejected");
            self.message = Some(err.to_string());
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.message = None;

        if let KeyCode::Char(c) = key.code {
            if let Some(offset) = PIANO_KEYS.iter().position(|&k| k == c) {
                let pitch = (self.octave + 1) * 12 + offset as i32;
                self.play_note(pitch);
                return;
            }
        }

        let selected = self.handle.selected_track();
        let track = self.status.tracks.get(selected).cloned();

        let result = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
                Ok(())
            }

            // Transport
            KeyCode::Char(' ') => {
                if self.status.playing {
                    self.handle.stop()
                } else {
                    self.handle.play()
                }
            }
            KeyCode::Char('r') => self.handle.set_recording(!self.status.recording),
            KeyCode::Char('m') => self.handle.set_metronome(!self.status.metronome),
            KeyCode::Char('-') => self.handle.set_bpm(self.status.bpm - BPM_STEP),
            KeyCode::Char('=') | KeyCode::Char('+') => self.handle.set_bpm(self.status.bpm + BPM_STEP),

            // Octave for the piano keys
            KeyCode::Char('z') => {
                self.octave = (self.octave - 1).max(0);
                Ok(())
            }
            KeyCode::Char('x') => {
                self.octave = (self.octave + 1).min(9);
                Ok(())
            }

            // Note editor
            KeyCode::Left => self.move_cursor(-0.25, 0),
            KeyCode::Right => self.move_cursor(0.25, 0),
            KeyCode::Up => self.move_cursor(0.0, 1),
            KeyCode::Down => self.move_cursor(0.0, -1),
            KeyCode::Enter => {
                self.handle.add_note(self.cursor_pitch, self.cursor_beat);
                Ok(())
            }
            KeyCode::Backspace | KeyCode::Delete => {
                self.handle.remove_note(self.cursor_pitch, self.cursor_beat);
                Ok(())
            }
            KeyCode::Char('c') => {
                self.handle.clear_notes();
                Ok(())
            }

            // Tracks
            KeyCode::Tab => {
                let count = self.status.tracks.len().max(1);
                self.handle.select_track((selected + 1) % count)
            }
            KeyCode::Char('n') => {
                let name = format!("Synth {}", self.status.tracks.len() + 1);
                self.handle.add_track(name).and_then(|i| self.handle.select_track(i))
            }
            KeyCode::Char('M') => match track {
                Some(t) => self.handle.set_muted(selected, !t.muted),
                None => Ok(()),
            },
            KeyCode::Char('S') => match track {
                Some(t) => self.handle.set_soloed(selected, !t.soloed),
                None => Ok(()),
            },
            KeyCode::Char('9') => match track {
                Some(t) => self.handle.set_volume(selected, t.volume - VOLUME_STEP),
                None => Ok(()),
            },
            KeyCode::Char('0') => match track {
                Some(t) => self.handle.set_volume(selected, t.volume + VOLUME_STEP),
                None => Ok(()),
            },
            KeyCode::Char(',') => match track {
                Some(t) => self.handle.set_pan(selected, t.pan - PAN_STEP),
                None => Ok(()),
            },
            KeyCode::Char('.') => match track {
                Some(t) => self.handle.set_pan(selected, t.pan + PAN_STEP),
                None => Ok(()),
            },

            // Synth parameters
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as i32 - '1' as i32;
                self.handle
                    .set_parameter(Parameter::Oscillator, index as f32)
            }
            KeyCode::Char('[') => self.scale_parameter(Parameter::Cutoff, 1.0 / CUTOFF_RATIO),
            KeyCode::Char(']') => self.scale_parameter(Parameter::Cutoff, CUTOFF_RATIO),
            KeyCode::Char(';') => self.nudge_parameter(Parameter::Resonance, -RESONANCE_STEP),
            KeyCode::Char('\'') => self.nudge_parameter(Parameter::Resonance, RESONANCE_STEP),

            _ => Ok(()),
        };

        self.report(result);
    }

    fn play_note(&mut self, pitch: i32) {
        if let Some(pos) = self.held.iter().position(|&(p, _)| p == pitch) {
            self.held.remove(pos);
            let result = self.handle.note_off(pitch);
            self.report(result);
        }
        let result = self.handle.note_on(pitch, 0.9);
        if result.is_ok() {
            self.held.push((pitch, Instant::now()));
        }
        self.report(result);
    }

    fn move_cursor(&mut self, beats: f64, pitch: i32) -> EngineResult<()> {
        let loop_length = self.status.loop_length;
        self.cursor_beat = (self.cursor_beat + beats).rem_euclid(loop_length);
        self.cursor_pitch = (self.cursor_pitch + pitch).clamp(0, 127);
        Ok(())
    }

    fn scale_parameter(&mut self, name: Parameter, ratio: f32) -> EngineResult<()> {
        let value = self.handle.parameter(name)?;
        self.handle.set_parameter(name, value * ratio)
    }

    fn nudge_parameter(&mut self, name: Parameter, delta: f32) -> EngineResult<()> {
        let value = self.handle.parameter(name)?;
        self.handle.set_parameter(name, value + delta)
    }

    /// Parameters of the selected track, if it has a synth.
    pub fn synth_parameters(&self) -> Option<(Waveform, f32, f32)> {
        let waveform = self.handle.parameter(Parameter::Oscillator).ok()?;
        let cutoff = self.handle.parameter(Parameter::Cutoff).ok()?;
        let resonance = self.handle.parameter(Parameter::Resonance).ok()?;
        Some((Waveform::from_index(waveform as i32), cutoff, resonance))
    }
}
