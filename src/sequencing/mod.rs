//! Musical time: the transport clock, the loop's note timeline and the
//! bridge that schedules one from the other.

pub mod bridge;
pub mod events;
pub mod timeline;
pub mod transport;

pub use bridge::{beat_in_window, BlockReport, BlockWindow, SequencerBridge};
pub use events::{EventList, TrackEvent};
pub use timeline::{NoteEvent, NoteTimeline, SnapshotStatus};
pub use transport::{Transport, TransportState};
