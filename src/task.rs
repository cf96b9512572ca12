//! The task node: a single-assignment result cell, a dependency counter,
//! and the dispatch between "body produced a value" and "body continued
//! into another task".

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::continuation::ContinuationHolder;
use crate::pool::{self, Runnable};
use crate::{taskgraph_trace, taskgraph_warn};

/// A unique identifier assigned to every task node, in construction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> TaskId {
    TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
}

/// What a task body produced.
///
/// A body returns `Outcome::Ready(value)` when it has computed its result
/// directly, or `Outcome::Continue(handle)` when it wants this task's
/// completion to be the completion of `handle` (the "continuation
/// transfer" / dynamic task creation case). Either way, callers of
/// [`TaskHandle::result`] only ever see a plain `R`-shaped result: the
/// builder peels the `Continue` wrapping internally so a task-of-task
/// handle is never observable from outside this module.
pub enum Outcome<R> {
    Ready(R),
    Continue(TaskHandle<R>),
}

impl<R> Outcome<R> {
    /// Convenience constructor for the common case of a directly computed
    /// value.
    pub fn ready(value: R) -> Self {
        Outcome::Ready(value)
    }
}

enum Cell<R: Send + Sync + 'static> {
    Empty,
    Value(Arc<R>),
    Alias(TaskHandle<R>),
    Panicked(Arc<str>),
}

struct ResultCell<R: Send + Sync + 'static> {
    state: Mutex<Cell<R>>,
    ready: Condvar,
}

impl<R: Send + Sync + 'static> ResultCell<R> {
    fn new() -> Self {
        Self {
            state: Mutex::new(Cell::Empty),
            ready: Condvar::new(),
        }
    }

    fn publish(&self, value: Arc<R>) {
        let mut state = self.state.lock();
        debug_assert!(matches!(*state, Cell::Empty));
        *state = Cell::Value(value);
        self.ready.notify_all();
    }

    fn alias(&self, handle: TaskHandle<R>) {
        let mut state = self.state.lock();
        debug_assert!(matches!(*state, Cell::Empty));
        *state = Cell::Alias(handle);
        self.ready.notify_all();
    }

    fn poison(&self, message: Arc<str>) {
        let mut state = self.state.lock();
        debug_assert!(matches!(*state, Cell::Empty));
        *state = Cell::Panicked(message);
        self.ready.notify_all();
    }

    fn get(&self) -> Arc<R> {
        let mut state = self.state.lock();
        loop {
            match &*state {
                Cell::Empty => self.ready.wait(&mut state),
                Cell::Value(value) => return Arc::clone(value),
                Cell::Alias(handle) => {
                    let handle = TaskHandle::clone(handle);
                    drop(state);
                    return handle.result();
                }
                Cell::Panicked(message) => {
                    panic!("task body panicked: {message}");
                }
            }
        }
    }
}

struct TaskInner<R: Send + Sync + 'static> {
    id: TaskId,
    cell: ResultCell<R>,
    holder: Arc<ContinuationHolder>,
    pending: AtomicUsize,
    body: Mutex<Option<Box<dyn FnOnce() -> Outcome<R> + Send>>>,
}

/// A handle to a (possibly still-running) task node.
///
/// Cheap to clone (an `Arc` underneath); every clone observes the same
/// result. Never wraps another `TaskHandle`; continuation transfer is
/// resolved internally, so `TaskHandle<R>` always means "eventually
/// produces an `R`", never "eventually produces a task that produces an
/// `R`".
pub struct TaskHandle<R: Send + Sync + 'static> {
    inner: Arc<TaskInner<R>>,
}

impl<R: Send + Sync + 'static> Clone for TaskHandle<R> {
    fn clone(&self) -> Self {
        TaskHandle {
            inner: self.inner.clone(),
        }
    }
}

impl<R: Send + Sync + 'static> fmt::Debug for TaskHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle").field("id", &self.inner.id).finish()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> Arc<str> {
    if let Some(message) = payload.downcast_ref::<&str>() {
        Arc::from(*message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        Arc::from(message.as_str())
    } else {
        Arc::from("non-string panic payload")
    }
}

impl<R: Send + Sync + 'static> TaskInner<R> {
    fn signal_dependency(self: &Arc<Self>) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            taskgraph_trace!(task_id = self.id.0, "all dependencies satisfied");
            if let Err(err) = pool::schedule(Arc::clone(self)) {
                taskgraph_warn!(
                    task_id = self.id.0,
                    error = %err,
                    "failed to schedule task after its last dependency signaled"
                );
            }
        }
    }
}

impl<R: Send + Sync + 'static> Runnable for TaskInner<R> {
    fn run(self: Arc<Self>) {
        let body = self
            .body
            .lock()
            .take()
            .expect("task body invoked more than once");

        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(body)) {
            Ok(Outcome::Ready(value)) => {
                self.cell.publish(Arc::new(value));
                self.holder.fire();
            }
            Ok(Outcome::Continue(inner)) => {
                let dest = inner.inner.holder.clone();
                self.cell.alias(inner);
                self.holder.transfer(dest);
            }
            Err(payload) => {
                let message = panic_message(payload);
                taskgraph_warn!(task_id = self.id.0, %message, "task body panicked");
                self.cell.poison(message);
                self.holder.fire();
            }
        }
    }
}

impl<R: Send + Sync + 'static> TaskHandle<R> {
    /// Build a task node with `pending_deps` outstanding dependencies and
    /// the given body, submitting it immediately if it has none.
    ///
    /// Not exposed directly; callers go through `make_task*`/`when_all` in
    /// the `graph` module, which also wire dependency signaling before any
    /// dependency can fire.
    pub(crate) fn new_node(
        pending_deps: usize,
        body: Box<dyn FnOnce() -> Outcome<R> + Send>,
    ) -> Self {
        let inner = Arc::new(TaskInner {
            id: next_task_id(),
            cell: ResultCell::new(),
            holder: ContinuationHolder::new(),
            pending: AtomicUsize::new(pending_deps),
            body: Mutex::new(Some(body)),
        });
        let handle = TaskHandle { inner };
        if pending_deps == 0 {
            if let Err(err) = pool::schedule(handle.inner.clone()) {
                taskgraph_warn!(
                    task_id = handle.inner.id.0,
                    error = %err,
                    "failed to schedule a dependency-free task at construction"
                );
            }
        }
        handle
    }

    /// This task's unique identifier.
    pub fn id(&self) -> TaskId {
        self.inner.id
    }

    /// Register `action` to run once this task (or, after a continuation
    /// transfer, the task it transferred into) has fired.
    pub(crate) fn on_ready(&self, action: Box<dyn FnOnce() + Send>) {
        self.inner.holder.attach(action);
    }

    /// Signal that one of this task's dependencies has completed. Once
    /// every dependency has signaled, the task is submitted to the pool.
    pub(crate) fn signal_dependency(&self) {
        self.inner.signal_dependency();
    }

    /// Block the calling thread until this task has a result, then return
    /// it. Safe to call from multiple threads and multiple times; every
    /// caller observes the same value.
    ///
    /// Panics if the task's body panicked.
    pub fn result(&self) -> Arc<R> {
        self.inner.cell.get()
    }
}
