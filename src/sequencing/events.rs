//! Fixed-capacity list of note events for one block.
//!
//! Filled by the sequencer bridge and the live-input path, consumed by the
//! mixer. Capacity is reserved up front; once full, further events are
//! counted and dropped instead of growing the list on the audio thread.

use crate::synth::SynthMessage;

/// A note message addressed to one mixer track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackEvent {
    pub track: usize,
    pub message: SynthMessage,
}

#[derive(Debug)]
pub struct EventList {
    events: Vec<TrackEvent>,
    dropped: usize,
}

impl EventList {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity.max(1)),
            dropped: 0,
        }
    }

    /// Append an event. Returns false (and counts a drop) when full.
    pub fn push(&mut self, track: usize, message: SynthMessage) -> bool {
        if self.events.len() == self.events.capacity() {
            self.dropped += 1;
            return false;
        }
        self.events.push(TrackEvent { track, message });
        true
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.dropped = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackEvent> {
        self.events.iter()
    }

    /// Messages addressed to `track`, in insertion order.
    pub fn for_track(&self, track: usize) -> impl Iterator<Item = SynthMessage> + '_ {
        self.events
            .iter()
            .filter(move |e| e.track == track)
            .map(|e| e.message)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events refused since the last `clear`.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_events_past_capacity() {
        let mut events = EventList::with_capacity(2);
        let msg = SynthMessage::AllNotesOff;
        let capacity = events.events.capacity();

        for _ in 0..capacity {
            assert!(events.push(0, msg));
        }
        assert!(!events.push(0, msg));
        assert_eq!(events.len(), capacity);
        assert_eq!(events.dropped(), 1);

        events.clear();
        assert!(events.is_empty());
        assert_eq!(events.dropped(), 0);
    }

    #[test]
    fn filters_by_track() {
        let mut events = EventList::with_capacity(8);
        events.push(0, SynthMessage::NoteOn { note: 60, velocity: 1.0 });
        events.push(1, SynthMessage::NoteOn { note: 62, velocity: 1.0 });
        events.push(0, SynthMessage::NoteOff { note: 60, allow_tail: true });

        let track0: Vec<_> = events.for_track(0).collect();
        assert_eq!(track0.len(), 2);
        assert_eq!(events.for_track(1).count(), 1);
        assert_eq!(events.for_track(5).count(), 0);
    }
}
