//! NoteTimeline - the loop's note data
//!
//! A start-sorted list of notes behind a mutex. The control path edits it;
//! the render path copies it into a preallocated snapshot once per block with
//! `try_lock`, so it never waits on an editor and never holds the lock while
//! generating samples.
//!
//! Live recording goes through the same object: a note-on opens a pending
//! capture for its pitch, the matching note-off closes it and commits a
//! `NoteEvent`.

use parking_lot::Mutex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::LOOP_LENGTH_BEATS;

/// Two notes of the same pitch closer than this are the same note.
pub const DEDUP_EPSILON: f64 = 0.01;
/// How far off a remove request may be and still hit a note.
pub const REMOVE_TOLERANCE: f64 = 0.1;
/// Shortest note the timeline stores.
pub const MIN_DURATION_BEATS: f64 = 0.1;

const PITCHES: usize = 128;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    /// MIDI note number (0-127)
    pub pitch: u8,
    /// Normalised velocity (0.0-1.0)
    pub velocity: f32,
    /// Loop position of the note-on, in beats
    pub start_beat: f64,
    /// Length in beats
    pub duration_beats: f64,
}

impl NoteEvent {
    /// Build a note, clamping every field into range.
    pub fn new(pitch: i32, velocity: f32, start_beat: f64, duration_beats: f64) -> Self {
        let velocity = if velocity.is_nan() { 0.0 } else { velocity };
        let start_beat = if start_beat.is_finite() { start_beat } else { 0.0 };
        let duration_beats = if duration_beats.is_finite() {
            duration_beats
        } else {
            MIN_DURATION_BEATS
        };

        Self {
            pitch: pitch.clamp(0, 127) as u8,
            velocity: velocity.clamp(0.0, 1.0),
            start_beat: start_beat.max(0.0),
            duration_beats: duration_beats.max(MIN_DURATION_BEATS),
        }
    }

    /// Dedup identity: same pitch, start within `DEDUP_EPSILON`.
    pub fn same_slot(&self, other: &NoteEvent) -> bool {
        self.pitch == other.pitch && (self.start_beat - other.start_beat).abs() < DEDUP_EPSILON
    }

    /// Where the note-off lands inside a loop of `loop_length` beats.
    pub fn end_beat(&self, loop_length: f64) -> f64 {
        (self.start_beat + self.duration_beats).rem_euclid(loop_length)
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingNote {
    start_beat: f64,
    velocity: f32,
}

#[derive(Debug)]
struct TimelineInner {
    notes: Vec<NoteEvent>,
    pending: [Option<PendingNote>; PITCHES],
}

impl TimelineInner {
    fn insert(&mut self, note: NoteEvent) {
        self.notes.retain(|n| !n.same_slot(&note));
        let idx = self
            .notes
            .partition_point(|n| n.start_beat <= note.start_beat);
        self.notes.insert(idx, note);
    }
}

/// Result of a render-path snapshot attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// The snapshot now mirrors the timeline.
    Fresh,
    /// The timeline outgrew the snapshot capacity; the tail was left out.
    Truncated,
    /// An editor held the lock; the previous snapshot was kept.
    Busy,
}

#[derive(Debug)]
pub struct NoteTimeline {
    inner: Mutex<TimelineInner>,
    loop_length: f64,
}

impl Default for NoteTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteTimeline {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TimelineInner {
                notes: Vec::new(),
                pending: [None; PITCHES],
            }),
            loop_length: LOOP_LENGTH_BEATS,
        }
    }

    /// Insert a note in start order, replacing any note in the same slot.
    ///
    /// Returns the note as stored (after clamping).
    pub fn add_note(&self, note: NoteEvent) -> NoteEvent {
        let note = NoteEvent::new(
            note.pitch as i32,
            note.velocity,
            note.start_beat,
            note.duration_beats,
        );
        self.inner.lock().insert(note);
        note
    }

    /// Remove every note of `pitch` starting within `REMOVE_TOLERANCE` of
    /// `start_beat`. Returns how many were removed.
    pub fn remove_note(&self, pitch: i32, start_beat: f64) -> usize {
        let pitch = pitch.clamp(0, 127) as u8;
        let mut inner = self.inner.lock();
        let before = inner.notes.len();
        inner.notes.retain(|n| {
            !(n.pitch == pitch && (n.start_beat - start_beat).abs() < REMOVE_TOLERANCE)
        });
        before - inner.notes.len()
    }

    /// Drop every note and every unfinished capture.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.notes.clear();
        inner.pending = [None; PITCHES];
    }

    /// Owned copy of the notes, for display and persistence.
    pub fn snapshot(&self) -> Vec<NoteEvent> {
        self.inner.lock().notes.clone()
    }

    /// Render-path copy into a preallocated vector.
    ///
    /// Never blocks and never grows `dst` past its capacity.
    pub fn snapshot_into(&self, dst: &mut Vec<NoteEvent>) -> SnapshotStatus {
        let Some(inner) = self.inner.try_lock() else {
            return SnapshotStatus::Busy;
        };

        let count = inner.notes.len().min(dst.capacity());
        dst.clear();
        dst.extend_from_slice(&inner.notes[..count]);

        if count < inner.notes.len() {
            SnapshotStatus::Truncated
        } else {
            SnapshotStatus::Fresh
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn loop_length(&self) -> f64 {
        self.loop_length
    }

    /// Open a capture for `pitch` at `beat`. A second note-on for a pitch that
    /// is already open restarts the capture.
    pub fn begin_capture(&self, pitch: u8, velocity: f32, beat: f64) {
        let mut inner = self.inner.lock();
        let Some(slot) = inner.pending.get_mut(pitch as usize) else {
            return;
        };
        *slot = Some(PendingNote {
            start_beat: beat,
            velocity,
        });
    }

    /// Close the capture for `pitch` at `beat` and commit the note.
    ///
    /// A release earlier in the loop than its press wrapped around the loop
    /// end. Returns `None` when no capture was open for the pitch.
    pub fn end_capture(&self, pitch: u8, beat: f64) -> Option<NoteEvent> {
        let mut inner = self.inner.lock();
        let pending = inner.pending.get_mut(pitch as usize)?.take()?;

        let mut duration = beat - pending.start_beat;
        if duration < 0.0 {
            duration += self.loop_length;
        }

        let note = NoteEvent::new(
            pitch as i32,
            pending.velocity,
            pending.start_beat,
            duration,
        );
        inner.insert(note);
        Some(note)
    }

    /// Throw away captures that never got their note-off. Returns how many.
    pub fn discard_pending(&self) -> usize {
        let mut inner = self.inner.lock();
        let open = inner.pending.iter().filter(|p| p.is_some()).count();
        inner.pending = [None; PITCHES];
        open
    }

    pub fn pending_count(&self) -> usize {
        self.inner
            .lock()
            .pending
            .iter()
            .filter(|p| p.is_some())
            .count()
    }
}
