//! Logging from the render path.
//!
//! The audio callback cannot format strings or take the subscriber's locks,
//! so it records small `Copy` events into a ring buffer instead. The control
//! path drains the ring and replays the records through `tracing`.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{debug, info, warn};

use crate::sequencing::TransportState;

/// Something worth reporting that happened while rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RtEvent {
    /// The block's event list filled up; `count` note events were lost.
    EventsDropped { count: usize },
    /// The timeline was being edited; the previous snapshot was reused.
    SnapshotBusy,
    /// The timeline holds more notes than the render-side snapshot.
    SnapshotTruncated { capacity: usize },
    /// A command arrived for a track the render side does not have yet.
    UnknownTrack { track: usize },
    /// New tracks were adopted; `count` is the live total.
    TracksAdopted { count: usize },
    TransportChanged { state: TransportState, beat: f64 },
}

/// Render-side sink. Never blocks: a full ring drops the record.
pub struct RtLogger {
    tx: Producer<RtEvent>,
    dropped: Arc<AtomicU64>,
}

/// Control-side end of the realtime log.
pub struct LogDrain {
    rx: Consumer<RtEvent>,
    dropped: Arc<AtomicU64>,
    reported: u64,
}

pub fn channel(capacity: usize) -> (RtLogger, LogDrain) {
    let (tx, rx) = RingBuffer::new(capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    (
        RtLogger {
            tx,
            dropped: Arc::clone(&dropped),
        },
        LogDrain {
            rx,
            dropped,
            reported: 0,
        },
    )
}

impl RtLogger {
    pub fn log(&mut self, event: RtEvent) {
        if self.tx.push(event).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl LogDrain {
    /// Replay every pending record through `tracing`. Returns how many.
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.rx.pop() {
            emit(event);
            count += 1;
        }

        let dropped = self.dropped.load(Ordering::Relaxed);
        if dropped > self.reported {
            warn!(lost = dropped - self.reported, "realtime log overflowed");
            self.reported = dropped;
        }
        count
    }

    /// Records lost to a full ring since startup.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

fn emit(event: RtEvent) {
    match event {
        RtEvent::EventsDropped { count } => warn!(count, "note events dropped, event list full"),
        RtEvent::SnapshotBusy => debug!("timeline busy, reusing previous snapshot"),
        RtEvent::SnapshotTruncated { capacity } => {
            warn!(capacity, "timeline larger than render snapshot, notes skipped")
        }
        RtEvent::UnknownTrack { track } => debug!(track, "command for a track not yet adopted"),
        RtEvent::TracksAdopted { count } => debug!(count, "tracks adopted"),
        RtEvent::TransportChanged { state, beat } => info!(?state, beat, "transport"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_ring_counts_drops() {
        let (mut logger, mut drain) = channel(2);
        logger.log(RtEvent::SnapshotBusy);
        logger.log(RtEvent::SnapshotBusy);
        logger.log(RtEvent::SnapshotBusy);

        assert_eq!(drain.drain(), 2);
        assert_eq!(drain.dropped(), 1);

        logger.log(RtEvent::TracksAdopted { count: 1 });
        assert_eq!(drain.drain(), 1);
        assert_eq!(drain.drain(), 0);
    }
}
