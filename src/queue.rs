//! Blocking multi-producer / multi-consumer FIFO used by the worker pool.
//!
//! `push` never blocks and never rejects; `pop` blocks the calling thread
//! until a value is available. Enqueue order is preserved across arbitrary
//! producer interleaving.

use crossbeam_channel::{Receiver, Sender, unbounded};

/// A blocking FIFO queue.
///
/// Internally backed by `crossbeam_channel`, which already provides the
/// exact contract this type needs (non-blocking push, blocking pop, total
/// enqueue order); this wrapper exists so the rest of the crate talks to a
/// `Queue<T>` rather than a raw channel pair, and so the sender/receiver
/// split is not exposed to callers.
pub(crate) struct Queue<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T> Queue<T> {
    /// Create a new, empty queue.
    pub(crate) fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Push a value onto the queue. Never blocks, never fails.
    pub(crate) fn push(&self, value: T) {
        // `unbounded()` channels only fail to send once every receiver has
        // been dropped, which cannot happen here: the queue outlives every
        // worker thread that holds a receiver clone.
        let _ = self.sender.send(value);
    }

    /// Block until a value is available and remove it.
    pub(crate) fn pop(&self) -> T {
        self.receiver
            .recv()
            .expect("queue sender dropped while a worker was still waiting")
    }
}

impl<T> Clone for Queue<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
        }
    }
}
