//! Work queue between submitter threads and the owner thread
//!
//! A FIFO guarded by one mutex: producers append at the back, the owner
//! thread takes from the front. A closed mailbox rejects every push and hands
//! the item back, so the caller can report the rejection.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;

/// Rejected push; carries the item back to the caller.
pub enum PushError<T> {
    /// Capacity reached
    Full(T),
    /// Mailbox closed (owner thread shutting down)
    Closed(T),
}

impl<T> PushError<T> {
    /// The rejected item
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Closed(item) => item,
        }
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => write!(f, "Full(..)"),
            Self::Closed(_) => write!(f, "Closed(..)"),
        }
    }
}

struct Inner<T> {
    queue: VecDeque<T>,
    closed: bool,
}

/// Mutex-guarded FIFO with an optional capacity bound
pub struct Mailbox<T> {
    inner: Mutex<Inner<T>>,
    capacity: Option<usize>,
}

impl<T> Mailbox<T> {
    /// Create an open mailbox holding at most `capacity` items (`None` = unbounded).
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                queue: VecDeque::new(),
                closed: false,
            }),
            capacity,
        }
    }

    /// Append at the back.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(PushError::Closed(item));
        }
        if self.capacity.is_some_and(|cap| inner.queue.len() >= cap) {
            return Err(PushError::Full(item));
        }
        inner.queue.push_back(item);
        Ok(())
    }

    /// Append at the back ignoring the capacity bound. Still fails once closed.
    pub fn push_unbounded(&self, item: T) -> Result<(), PushError<T>> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(PushError::Closed(item));
        }
        inner.queue.push_back(item);
        Ok(())
    }

    /// Remove the oldest item. Never blocks beyond the queue mutex.
    pub fn pop(&self) -> Option<T> {
        self.inner.lock().queue.pop_front()
    }

    /// Close the mailbox and return everything still pending, oldest first.
    pub fn close(&self) -> Vec<T> {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.queue.drain(..).collect()
    }

    /// Pending item count
    pub fn len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.inner.lock().queue.is_empty()
    }

    /// Whether [`close`](Self::close) was called
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}

impl<T> fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Mailbox")
            .field("pending", &inner.queue.len())
            .field("closed", &inner.closed)
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pop_returns_oldest_first() {
        let mailbox = Mailbox::new(None);
        for i in 0..5 {
            mailbox.push(i).unwrap();
        }
        let drained: Vec<_> = std::iter::from_fn(|| mailbox.pop()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_pop_empty_is_none() {
        let mailbox: Mailbox<u8> = Mailbox::new(None);
        assert!(mailbox.pop().is_none());
        assert!(mailbox.is_empty());
    }

    #[test]
    fn test_full_hands_item_back() {
        let mailbox = Mailbox::new(Some(2));
        mailbox.push('a').unwrap();
        mailbox.push('b').unwrap();
        match mailbox.push('c') {
            Err(PushError::Full(item)) => assert_eq!(item, 'c'),
            other => panic!("expected Full, got {other:?}"),
        }
        assert_eq!(mailbox.len(), 2);
    }

    #[test]
    fn test_unbounded_push_bypasses_capacity_not_close() {
        let mailbox = Mailbox::new(Some(1));
        mailbox.push(1).unwrap();
        mailbox.push_unbounded(2).unwrap();
        assert_eq!(mailbox.len(), 2);
        mailbox.close();
        assert!(matches!(mailbox.push_unbounded(3), Err(PushError::Closed(3))));
    }

    #[test]
    fn test_close_drains_and_rejects() {
        let mailbox = Mailbox::new(None);
        mailbox.push(1).unwrap();
        mailbox.push(2).unwrap();
        assert_eq!(mailbox.close(), vec![1, 2]);
        assert!(mailbox.is_closed());
        assert_eq!(mailbox.push(3).map_err(PushError::into_inner), Err(3));
        assert!(mailbox.pop().is_none());
    }

    proptest! {
        #[test]
        fn prop_fifo_order_preserved(items in proptest::collection::vec(any::<u32>(), 0..200)) {
            let mailbox = Mailbox::new(None);
            for &item in &items {
                mailbox.push(item).unwrap();
            }
            let drained: Vec<_> = std::iter::from_fn(|| mailbox.pop()).collect();
            prop_assert_eq!(drained, items);
        }
    }
}
