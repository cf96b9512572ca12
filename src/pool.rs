//! The worker pool: a process-wide singleton owning a fixed set of threads
//! that drain the task queue.
//!
//! Hand-rolled rather than built on `rayon`: callers need an enumerable
//! set of worker threads and a sentinel-based `shutdown` that joins every
//! one of them, which an opaque work-stealing pool doesn't expose (see
//! `DESIGN.md`).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use crate::error::{Result, TaskGraphError};
use crate::queue::Queue;
use crate::{taskgraph_info, taskgraph_trace, taskgraph_warn};

/// A unit of work the pool can execute: a task node that has become
/// runnable (all of its dependencies have signaled).
///
/// Implemented by `TaskInner<R>` for every result type `R`, letting the
/// queue carry `Arc<dyn Runnable>` regardless of what any individual task
/// computes.
pub(crate) trait Runnable: Send + Sync {
    fn run(self: Arc<Self>);
}

pub(crate) enum Job {
    Run(Arc<dyn Runnable>),
    Shutdown,
}

/// Configuration for [`init_with_config`].
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of worker threads. `None` uses
    /// `std::thread::available_parallelism()`.
    pub num_threads: Option<usize>,
    /// Name prefix for worker threads (`"{prefix}-{index}"`).
    pub thread_name: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            thread_name: "taskgraph-worker".to_string(),
        }
    }
}

impl WorkerPoolConfig {
    /// Create a configuration with an explicit worker thread count.
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads: Some(num_threads),
            ..Default::default()
        }
    }
}

struct PoolInner {
    queue: Queue<Job>,
    shutting_down: AtomicBool,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

/// The global pool slot. `None` outside of `init`/`shutdown`.
static POOL: Mutex<Option<Arc<PoolInner>>> = Mutex::new(None);

fn instance() -> Option<Arc<PoolInner>> {
    POOL.lock().clone()
}

/// Construct and start the singleton worker pool with default settings
/// (thread count = `std::thread::available_parallelism()`).
///
/// Must be called before any task construction. Returns
/// [`TaskGraphError::AlreadyInitialized`] if a pool is already running.
pub fn init() -> Result<()> {
    init_with_config(WorkerPoolConfig::default())
}

/// Construct and start the singleton worker pool with a custom
/// configuration.
pub fn init_with_config(config: WorkerPoolConfig) -> Result<()> {
    let mut slot = POOL.lock();
    if slot.is_some() {
        taskgraph_warn!("init called while a pool was already running");
        return Err(TaskGraphError::AlreadyInitialized);
    }

    let num_threads = config.num_threads.unwrap_or_else(|| {
        thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    });

    let inner = Arc::new(PoolInner {
        queue: Queue::new(),
        shutting_down: AtomicBool::new(false),
        threads: Mutex::new(Vec::new()),
    });

    let mut threads = Vec::with_capacity(num_threads);
    for index in 0..num_threads {
        let worker_pool = inner.clone();
        let name = format!("{}-{index}", config.thread_name);
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || worker_loop(&worker_pool))
            .expect("failed to spawn worker thread");
        threads.push(handle);
    }
    *inner.threads.lock() = threads;

    taskgraph_info!(num_threads, "worker pool initialized");
    *slot = Some(inner);
    Ok(())
}

fn worker_loop(pool: &PoolInner) {
    loop {
        match pool.queue.pop() {
            Job::Run(task) => {
                taskgraph_trace!("dispatching task");
                task.run();
            }
            Job::Shutdown => return,
        }
    }
}

/// Enqueue one sentinel per worker, then join every worker thread.
///
/// Must be preceded by the completion of every task the embedder intends
/// to observe: tasks still queued behind the sentinels will not run.
/// Returns [`TaskGraphError::NotInitialized`] if no pool is running.
pub fn shutdown() -> Result<()> {
    // The pool stays the live singleton (with `shutting_down` flagged) for
    // the duration of the join, rather than being removed from `POOL`
    // up front: a `schedule` racing this call should see `ShuttingDown`
    // while sentinels are still draining, and only `NotInitialized` once
    // every worker has actually exited and the slot below is cleared.
    let inner = instance().ok_or(TaskGraphError::NotInitialized)?;

    inner.shutting_down.store(true, Ordering::Release);
    let threads = std::mem::take(&mut *inner.threads.lock());
    for _ in &threads {
        inner.queue.push(Job::Shutdown);
    }
    for handle in threads {
        let _ = handle.join();
    }

    *POOL.lock() = None;
    taskgraph_info!("worker pool shut down");
    Ok(())
}

/// Push a runnable task onto the pool's queue.
///
/// Safe to call from any thread, including from inside a running task's
/// body (a task can build and schedule new tasks).
pub(crate) fn schedule(task: Arc<dyn Runnable>) -> Result<()> {
    let inner = instance().ok_or(TaskGraphError::NotInitialized)?;
    if inner.shutting_down.load(Ordering::Acquire) {
        return Err(TaskGraphError::ShuttingDown);
    }
    inner.queue.push(Job::Run(task));
    Ok(())
}
