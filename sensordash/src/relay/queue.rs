use super::Event;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel;

/// How many events a relay channel may hold before the producer has to
/// give something up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capacity {
    #[default]
    Unbounded,
    /// Keep at most this many events; a full channel discards its oldest one.
    DropOldest(usize),
}

impl From<Option<usize>> for Capacity {
    fn from(bound: Option<usize>) -> Capacity {
        match bound {
            Some(n) => Capacity::DropOldest(n),
            None => Capacity::Unbounded,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SendError {
    Disconnected(Event),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    /// Nothing queued right now.
    Empty,
    /// Every sender is gone and the queue is drained.
    Disconnected,
}

/// Producer side of a relay channel. Never blocks.
#[derive(Clone)]
pub struct EventSender {
    tx: channel::Sender<Event>,
    // Only set for DropOldest: lets the producer pop the head of a full queue.
    evict: Option<channel::Receiver<Event>>,
    dropped: Arc<AtomicU64>,
}

/// Consumer side of a relay channel.
pub struct EventReceiver {
    rx: channel::Receiver<Event>,
}

pub fn channel(capacity: Capacity) -> (EventSender, EventReceiver) {
    let (tx, rx, evict) = match capacity {
        Capacity::Unbounded => {
            let (tx, rx) = channel::unbounded();
            (tx, rx, None)
        }
        Capacity::DropOldest(n) => {
            let (tx, rx) = channel::bounded(n.max(1));
            let evict = rx.clone();
            (tx, rx, Some(evict))
        }
    };
    (
        EventSender {
            tx,
            evict,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        EventReceiver { rx },
    )
}

impl EventSender {
    /// Queues an event. With a bounded channel the oldest queued event is
    /// discarded to make room. Note that a bounded sender keeps the queue
    /// alive, so it never reports `Disconnected`.
    pub fn send(&self, event: Event) -> Result<(), SendError> {
        let mut event = event;
        loop {
            match self.tx.try_send(event) {
                Ok(()) => return Ok(()),
                Err(channel::TrySendError::Full(ev)) => {
                    if let Some(evict) = &self.evict {
                        if let Ok(old) = evict.try_recv() {
                            self.dropped.fetch_add(1, Ordering::Relaxed);
                            tracing::debug!(topic = %old.topic, "relay full, dropped oldest event");
                        }
                    }
                    event = ev;
                }
                Err(channel::TrySendError::Disconnected(ev)) => {
                    return Err(SendError::Disconnected(ev))
                }
            }
        }
    }

    /// Number of events discarded because the channel was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl EventReceiver {
    /// Returns the next event if one is queued, without waiting.
    pub fn try_recv(&self) -> Result<Event, RecvError> {
        match self.rx.try_recv() {
            Ok(ev) => Ok(ev),
            Err(channel::TryRecvError::Empty) => Err(RecvError::Empty),
            Err(channel::TryRecvError::Disconnected) => Err(RecvError::Disconnected),
        }
    }

    /// Waits up to `timeout` for an event.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Event, RecvError> {
        match self.rx.recv_timeout(timeout) {
            Ok(ev) => Ok(ev),
            Err(channel::RecvTimeoutError::Timeout) => Err(RecvError::Empty),
            Err(channel::RecvTimeoutError::Disconnected) => Err(RecvError::Disconnected),
        }
    }
}
