//! Logging facilities for the task graph scheduler.
//!
//! The crate uses the `tracing` crate for structured instrumentation. To see
//! logs, install a subscriber (e.g. `tracing_subscriber::fmt::init()`) in the
//! embedding application; this crate never installs one itself.
//!
//! Pool lifecycle events (`init`, `shutdown`) are logged at `info`, task
//! dispatch and continuation transfer at `trace`, and structural precondition
//! violations at `warn` before the corresponding [`crate::TaskGraphError`] is
//! returned.

/// Macros for common tracing patterns, wrapping the `tracing` crate's macros
/// with a consistent target name.
#[macro_export]
macro_rules! taskgraph_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "taskgraph", $($arg)*)
    };
}

#[macro_export]
macro_rules! taskgraph_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "taskgraph", $($arg)*)
    };
}

#[macro_export]
macro_rules! taskgraph_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "taskgraph", $($arg)*)
    };
}

#[macro_export]
macro_rules! taskgraph_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "taskgraph", $($arg)*)
    };
}
