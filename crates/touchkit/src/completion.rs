//! One-shot completion
//!
//! A heap-allocated, reference-counted slot shared by exactly one
//! [`Completer`] (owner side) and one [`Waiter`] (submitter side). Used for
//! blocking command results and for the startup handshake.
//!
//! ```text
//! submitter thread                 owner thread
//! ────────────────                 ────────────
//! let (tx, rx) = pair();
//! queue.push(cmd{tx}) ───────────▶ cmd runs
//! rx.wait() ◀──────────────────── tx.complete(result)
//! ```
//!
//! Either side may go away first: the slot lives until both halves are
//! dropped. Dropping a `Completer` without completing wakes the waiter with
//! [`ToolkitError::Abandoned`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{Result, ToolkitError};

enum Slot<T> {
    Pending,
    Done(T),
    Abandoned,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

/// Create a linked (completer, waiter) pair.
pub fn pair<T>() -> (Completer<T>, Waiter<T>) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot::Pending),
        ready: Condvar::new(),
    });
    (
        Completer {
            shared: Some(Arc::clone(&shared)),
        },
        Waiter { shared },
    )
}

/// Owner-side half: delivers the value exactly once.
pub struct Completer<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Completer<T> {
    /// Store `value` and wake the waiter.
    pub fn complete(mut self, value: T) {
        if let Some(shared) = self.shared.take() {
            *shared.slot.lock() = Slot::Done(value);
            shared.ready.notify_one();
        }
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            let mut slot = shared.slot.lock();
            if matches!(*slot, Slot::Pending) {
                *slot = Slot::Abandoned;
            }
            drop(slot);
            shared.ready.notify_one();
        }
    }
}

/// Submitter-side half: blocks until the value arrives.
pub struct Waiter<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Waiter<T> {
    fn take(slot: &mut Slot<T>) -> Option<Result<T>> {
        match core::mem::replace(slot, Slot::Pending) {
            Slot::Pending => None,
            Slot::Done(value) => Some(Ok(value)),
            Slot::Abandoned => Some(Err(ToolkitError::Abandoned)),
        }
    }

    /// Block until completed. `Abandoned` if the completer was dropped.
    pub fn wait(self) -> Result<T> {
        let mut slot = self.shared.slot.lock();
        loop {
            if let Some(result) = Self::take(&mut slot) {
                return result;
            }
            self.shared.ready.wait(&mut slot);
        }
    }

    /// Block for at most `timeout`. `Timeout` if the deadline passes first.
    pub fn wait_timeout(self, timeout: Duration) -> Result<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.wait();
        };
        let mut slot = self.shared.slot.lock();
        loop {
            if let Some(result) = Self::take(&mut slot) {
                return result;
            }
            if self.shared.ready.wait_until(&mut slot, deadline).timed_out() {
                return Self::take(&mut slot).unwrap_or(Err(ToolkitError::Timeout));
            }
        }
    }

    /// Whether a value (or abandonment) is already available
    pub fn is_ready(&self) -> bool {
        !matches!(*self.shared.slot.lock(), Slot::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_complete_before_wait() {
        let (tx, rx) = pair();
        tx.complete(42);
        assert!(rx.is_ready());
        assert_eq!(rx.wait(), Ok(42));
    }

    #[test]
    fn test_complete_from_other_thread() {
        let (tx, rx) = pair();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            tx.complete(String::from("done"));
        });
        assert_eq!(rx.wait().as_deref(), Ok("done"));
        handle.join().unwrap();
    }

    #[test]
    fn test_dropped_completer_abandons() {
        let (tx, rx) = pair::<u32>();
        drop(tx);
        assert_eq!(rx.wait(), Err(ToolkitError::Abandoned));
    }

    #[test]
    fn test_wait_timeout_expires() {
        let (_tx, rx) = pair::<u32>();
        let started = Instant::now();
        assert_eq!(
            rx.wait_timeout(Duration::from_millis(20)),
            Err(ToolkitError::Timeout)
        );
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_wait_timeout_gets_value() {
        let (tx, rx) = pair();
        thread::spawn(move || tx.complete(7u8));
        assert_eq!(rx.wait_timeout(Duration::from_secs(5)), Ok(7));
    }

    #[test]
    fn test_completer_outlives_waiter() {
        let (tx, rx) = pair();
        drop(rx);
        tx.complete(1);
    }
}
