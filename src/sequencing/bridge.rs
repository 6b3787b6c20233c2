//! Sequencer bridge: turns the timeline into note events, one block at a time.
//!
//! Scheduling is block-granular. For each block the bridge captures the beat
//! position before and after advancing the transport, then emits every
//! timeline note whose end or start falls inside `[before, after)`, with the
//! window wrapping across the loop end. Note-offs go out before note-ons so a
//! note that ends exactly where its next repetition starts is retriggered
//! instead of cut.

use crate::{
    sequencing::{
        events::EventList,
        timeline::{NoteEvent, NoteTimeline, SnapshotStatus},
        transport::Transport,
    },
    synth::SynthMessage,
};

/// True when `beat` lies in the half-open window `[before, after)`.
///
/// A window with `after < before` wrapped across the loop end and covers
/// `[before, loop_length) ∪ [0, after)`. An empty window (`before == after`)
/// contains nothing.
pub fn beat_in_window(beat: f64, before: f64, after: f64, loop_length: f64) -> bool {
    if after >= before {
        beat >= before && beat < after
    } else {
        (beat >= before && beat < loop_length) || (beat >= 0.0 && beat < after)
    }
}

/// True when a note starting at `start` and ending at `end` has been switched
/// on and not yet off by the time the transport sits at `beat`.
///
/// Mirrors the half-open windows: a note-on at `start` has fired once the
/// position moved past it, a note-off at `end` only once the position moved
/// past that. A note that wraps (`end <= start`) is held on both sides of the
/// loop end.
fn held_at(start: f64, end: f64, beat: f64) -> bool {
    if start < end {
        start < beat && beat <= end
    } else {
        beat > start || beat <= end
    }
}

/// Beat range one block covered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockWindow {
    pub before: f64,
    pub after: f64,
    pub loop_length: f64,
}

impl BlockWindow {
    pub fn contains(&self, beat: f64) -> bool {
        beat_in_window(beat, self.before, self.after, self.loop_length)
    }

    pub fn wrapped(&self) -> bool {
        self.after < self.before
    }

    /// Integer beats crossed by this block, in order. Used for the click.
    pub fn beat_ticks(&self) -> impl Iterator<Item = u32> + '_ {
        let whole = self.loop_length.ceil().max(0.0) as u32;
        (0..whole).filter(move |b| self.contains(*b as f64))
    }
}

/// Outcome of one block of scheduling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockReport {
    pub window: BlockWindow,
    pub snapshot: SnapshotStatus,
    pub note_ons: usize,
    pub note_offs: usize,
}

/// Render-side scheduler state.
///
/// Owns a preallocated copy of the timeline so the per-block scan never
/// holds the timeline lock. If an editor holds the lock when a block starts
/// the previous copy is reused.
pub struct SequencerBridge {
    snapshot: Vec<NoteEvent>,
}

impl SequencerBridge {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshot: Vec::with_capacity(capacity.max(1)),
        }
    }

    /// Advance `transport` by one block and queue the timeline's note events
    /// for `track`.
    ///
    /// Returns `None` while the transport is stopped: nothing moves and
    /// nothing is scheduled.
    pub fn process_block(
        &mut self,
        transport: &mut Transport,
        timeline: &NoteTimeline,
        block_samples: usize,
        sample_rate: f64,
        track: usize,
        events: &mut EventList,
    ) -> Option<BlockReport> {
        if !transport.is_playing() {
            return None;
        }

        let snapshot = timeline.snapshot_into(&mut self.snapshot);

        let before = transport.beat_position();
        transport.advance(block_samples, sample_rate);
        let window = BlockWindow {
            before,
            after: transport.beat_position(),
            loop_length: transport.loop_length(),
        };

        let mut note_offs = 0;
        for note in &self.snapshot {
            if window.contains(note.end_beat(window.loop_length)) {
                let message = SynthMessage::NoteOff {
                    note: note.pitch,
                    allow_tail: true,
                };
                if events.push(track, message) {
                    note_offs += 1;
                }
            }
        }

        let mut note_ons = 0;
        for note in &self.snapshot {
            if window.contains(note.start_beat) {
                let message = SynthMessage::NoteOn {
                    note: note.pitch,
                    velocity: note.velocity,
                };
                if events.push(track, message) {
                    note_ons += 1;
                }
            }
        }

        Some(BlockReport {
            window,
            snapshot,
            note_ons,
            note_offs,
        })
    }

    /// Queue note-offs on `track` for every timeline note that is sounding at
    /// `beat`, judged from the last snapshot. Used when the sequencer is
    /// rerouted so the old track is not left holding notes.
    pub fn release_held(
        &self,
        beat: f64,
        loop_length: f64,
        track: usize,
        events: &mut EventList,
    ) -> usize {
        let mut released = 0;
        for note in &self.snapshot {
            if !held_at(note.start_beat, note.end_beat(loop_length), beat) {
                continue;
            }
            let message = SynthMessage::NoteOff {
                note: note.pitch,
                allow_tail: true,
            };
            if events.push(track, message) {
                released += 1;
            }
        }
        released
    }

    /// Notes the last block scheduled from.
    pub fn snapshot(&self) -> &[NoteEvent] {
        &self.snapshot
    }
}
