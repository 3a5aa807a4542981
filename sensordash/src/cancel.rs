//! Cooperative shutdown shared by the long-running loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam::channel;

/// Clonable cancellation flag. Waiting on it wakes up as soon as any clone
/// calls [`CancelToken::cancel`].
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    trigger: Arc<Mutex<Option<channel::Sender<()>>>>,
    signal: channel::Receiver<()>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        let (tx, rx) = channel::bounded(0);
        CancelToken {
            cancelled: Arc::new(AtomicBool::new(false)),
            trigger: Arc::new(Mutex::new(Some(tx))),
            signal: rx,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // Dropping the only sender disconnects every waiting receiver.
        if let Ok(mut trigger) = self.trigger.lock() {
            trigger.take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration` unless cancelled first. Returns `true` if the
    /// full duration elapsed, `false` on cancellation.
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        match self.signal.recv_timeout(duration) {
            Err(channel::RecvTimeoutError::Timeout) => !self.is_cancelled(),
            _ => false,
        }
    }

    /// For use in `crossbeam::select!`: becomes ready once cancelled.
    pub fn receiver(&self) -> &channel::Receiver<()> {
        &self.signal
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        CancelToken::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleep_runs_to_completion() {
        let token = CancelToken::new();
        assert!(token.sleep(Duration::from_millis(5)));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_wakes_sleeper() {
        let token = CancelToken::new();
        let other = token.clone();
        let handle = std::thread::spawn(move || {
            let start = Instant::now();
            let finished = other.sleep(Duration::from_secs(60));
            (finished, start.elapsed())
        });
        std::thread::sleep(Duration::from_millis(20));
        token.cancel();
        let (finished, waited) = handle.join().unwrap();
        assert!(!finished);
        assert!(waited < Duration::from_secs(10));
    }

    #[test]
    fn cancel_is_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        assert!(!token.sleep(Duration::from_secs(60)));
    }
}
