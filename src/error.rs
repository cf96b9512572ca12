//! Error types for the task graph scheduler.

use std::fmt;

/// The error type for task-graph operations.
///
/// These are all structural precondition violations (spec terms them
/// "assertion-class" errors): double initialization, scheduling after
/// shutdown has begun, or fan-in over an empty task list. None of these
/// originate from a task body; body failures are surfaced by re-panicking
/// on [`crate::TaskHandle::result`] instead, matching `std::thread`'s own
/// `JoinHandle` convention.
#[derive(Debug)]
pub enum TaskGraphError {
    /// [`crate::init`] (or [`crate::init_with_config`]) was called while a
    /// pool was already running.
    AlreadyInitialized,
    /// An operation that requires a running pool was attempted before
    /// [`crate::init`] was called, or after [`crate::shutdown`] completed.
    NotInitialized,
    /// [`crate::when_all`] was called with an empty vector of tasks.
    EmptyWhenAll,
    /// A task was scheduled after [`crate::shutdown`] had already begun
    /// enqueuing sentinels.
    ShuttingDown,
}

impl fmt::Display for TaskGraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialized => {
                write!(f, "the worker pool has already been initialized")
            }
            Self::NotInitialized => {
                write!(f, "the worker pool has not been initialized. Call taskgraph::init() first")
            }
            Self::EmptyWhenAll => write!(f, "when_all requires at least one task"),
            Self::ShuttingDown => write!(f, "the worker pool is shutting down"),
        }
    }
}

impl std::error::Error for TaskGraphError {}

/// A specialized `Result` type for task-graph operations.
pub type Result<T> = std::result::Result<T, TaskGraphError>;
