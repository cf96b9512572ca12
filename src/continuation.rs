//! The continuation holder: per-task registry of "on-scheduled" callbacks.
//!
//! A holder starts `Pending`, accumulating actions as dependents attach to
//! it, and reaches exactly one of two terminal states: `Fired` (the task
//! completed locally and its result is in its own cell) or `Forwarded` (the
//! task's body returned another task, and downstream signaling should wait
//! on that inner task instead).

use std::sync::Arc;

use parking_lot::Mutex;

type Action = Box<dyn FnOnce() + Send>;

enum State {
    Pending(Vec<Action>),
    Fired,
    Forwarded(Arc<ContinuationHolder>),
}

/// Per-task coordination object accumulating callbacks to invoke once the
/// task's body has completed (or been transferred to an inner task).
pub(crate) struct ContinuationHolder {
    state: Mutex<State>,
}

impl ContinuationHolder {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::Pending(Vec::new())),
        })
    }

    /// Register `action` to run once this holder fires (or, transitively,
    /// once the holder it has been forwarded to fires).
    ///
    /// If the holder has already fired, `action` runs synchronously on the
    /// caller's thread. If it has been forwarded, the call delegates to the
    /// destination holder, which may itself be forwarded further.
    pub(crate) fn attach(&self, action: Action) {
        let forward_to = {
            let mut state = self.state.lock();
            match &mut *state {
                State::Pending(actions) => {
                    actions.push(action);
                    return;
                }
                State::Fired => None,
                State::Forwarded(dest) => Some(dest.clone()),
            }
        };

        match forward_to {
            Some(dest) => dest.attach(action),
            None => action(),
        }
    }

    /// Transition to `Fired` and run every accumulated action, in insertion
    /// order, on the firing thread.
    ///
    /// Asserts the holder was `Pending`: `fire` and [`Self::transfer`] are
    /// each called at most once per holder, and exactly one of the two
    /// occurs for every task that executes.
    pub(crate) fn fire(&self) {
        let actions = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, State::Fired) {
                State::Pending(actions) => actions,
                State::Fired | State::Forwarded(_) => {
                    panic!("ContinuationHolder::fire called on a holder that already terminated")
                }
            }
        };
        for action in actions {
            action();
        }
    }

    /// Transition to `Forwarded(dest)` and re-attach every accumulated
    /// action to `dest`, preserving insertion order.
    ///
    /// Asserts the holder was `Pending`, exactly like [`Self::fire`].
    pub(crate) fn transfer(&self, dest: Arc<ContinuationHolder>) {
        let actions = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, State::Forwarded(dest.clone())) {
                State::Pending(actions) => actions,
                State::Fired | State::Forwarded(_) => {
                    panic!("ContinuationHolder::transfer called on a holder that already terminated")
                }
            }
        };
        for action in actions {
            dest.attach(action);
        }
    }
}
