//! Thread-safe FIFO channel between one producer and one consumer.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Ownership-transferring message queue.
///
/// `push` never blocks and cannot fail for an in-memory value; `pop` reports
/// emptiness as `None` rather than an error. Insertion order is preserved
/// between the single producer and single consumer sharing an edge. The
/// queue is unbounded; see the policy note in the crate root.
pub struct Channel<T> {
    queue: Mutex<VecDeque<T>>,
}

impl<T> Channel<T> {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Take ownership of `value` and append it at the tail.
    pub fn push(&self, value: T) {
        self.lock().push_back(value);
    }

    /// Remove and return the head element, or `None` when the queue is
    /// empty. Ownership transfers to the caller.
    pub fn pop(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Current count. Advisory: may be stale the instant after observation
    /// under concurrent access, so callers use it only for idle decisions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<T>> {
        // A poisoned lock means some other thread panicked while holding it;
        // the queue itself is still structurally sound, so keep serving.
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}
