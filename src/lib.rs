//! A dynamic task-graph scheduler for in-process parallel computation.
//!
//! A computation is built up as a graph of small tasks: each task has a
//! fixed set of typed dependencies, runs once every dependency has a
//! result, and is run at most once on a process-wide worker pool. A task
//! body can itself return another task, and its own completion then becomes
//! that inner task's completion (`Outcome::Continue`), so a computation
//! can grow its own graph as it runs without the caller ever seeing a
//! "task of task" handle.
//!
//! ```no_run
//! use taskgraph::{self, make_task, Outcome};
//!
//! taskgraph::init().unwrap();
//!
//! let a = make_task((), |()| Outcome::Ready(4));
//! let b = make_task((), |()| Outcome::Ready(5));
//! let sum = make_task((a, b), |(x, y)| Outcome::Ready(*x + *y));
//!
//! assert_eq!(*sum.result(), 9);
//!
//! taskgraph::shutdown().unwrap();
//! ```
//!
//! # Dynamic graph growth
//!
//! A body can construct and return a new task instead of a plain value;
//! the outer task's completion is transferred to it:
//!
//! ```no_run
//! use taskgraph::{self, make_task, Outcome, TaskHandle};
//!
//! taskgraph::init().unwrap();
//!
//! let depth: TaskHandle<u32> = make_task((), |()| {
//!     Outcome::Continue(make_task((), |()| Outcome::Ready(1)))
//! });
//! assert_eq!(*depth.result(), 1);
//!
//! taskgraph::shutdown().unwrap();
//! ```
//!
//! # Fan-in
//!
//! [`when_all`] joins a dynamic-length list of same-typed tasks:
//!
//! ```no_run
//! use taskgraph::{self, make_task, when_all, Outcome};
//!
//! taskgraph::init().unwrap();
//!
//! let squares: Vec<_> = (0..5)
//!     .map(|i| make_task((), move |()| Outcome::Ready(i * i)))
//!     .collect();
//! let total = when_all(squares).unwrap();
//! let sum: i32 = total.result().iter().map(|r| **r).sum();
//! assert_eq!(sum, 30);
//!
//! taskgraph::shutdown().unwrap();
//! ```

#![warn(missing_docs)]

mod continuation;
mod error;
mod graph;
mod logging;
mod pool;
mod queue;
mod task;

pub use error::{Result, TaskGraphError};
pub use graph::{Dependencies, make_task, when_all};
pub use pool::{WorkerPoolConfig, init, init_with_config, shutdown};
pub use task::{Outcome, TaskHandle, TaskId};
