//! The graph-building surface: `make_task` (typed dependencies, at most
//! one level of task-of-task unwrapped automatically) and `when_all`
//! (dynamic-arity fan-in).

use std::sync::Arc;

use crate::error::{Result, TaskGraphError};
use crate::task::{Outcome, TaskHandle};

/// A typed list of task dependencies for [`make_task`].
///
/// Implemented for `()` (no dependencies) and for tuples of `TaskHandle<_>`
/// up to arity 6, every arity the worked examples in this crate's test
/// suite need. `when_all` covers the dynamic-arity case this trait
/// deliberately doesn't: a `Vec<TaskHandle<R>>` of uniform type.
pub trait Dependencies: Clone + Send + 'static {
    /// The tuple of dependency results a task body is called with.
    type Results: Send + 'static;

    /// Number of dependencies; the task's initial pending-dependency count.
    fn pending_count(&self) -> usize;

    /// Register `notify` to run once on each dependency's completion.
    fn wire(&self, notify: Arc<dyn Fn() + Send + Sync>);

    /// Read every dependency's result. Only called after every dependency
    /// has signaled, so none of these reads block.
    fn results(&self) -> Self::Results;
}

impl Dependencies for () {
    type Results = ();

    fn pending_count(&self) -> usize {
        0
    }

    fn wire(&self, _notify: Arc<dyn Fn() + Send + Sync>) {}

    fn results(&self) -> Self::Results {}
}

macro_rules! impl_dependencies {
    ($count:expr; $( $idx:tt : $ty:ident ),+) => {
        impl<$($ty: Send + Sync + 'static),+> Dependencies for ($(TaskHandle<$ty>,)+) {
            type Results = ($(Arc<$ty>,)+);

            fn pending_count(&self) -> usize {
                $count
            }

            fn wire(&self, notify: Arc<dyn Fn() + Send + Sync>) {
                $(
                    {
                        let notify = notify.clone();
                        self.$idx.on_ready(Box::new(move || notify()));
                    }
                )+
            }

            fn results(&self) -> Self::Results {
                ($( self.$idx.result(), )+)
            }
        }
    };
}

impl_dependencies!(1; 0: A);
impl_dependencies!(2; 0: A, 1: B);
impl_dependencies!(3; 0: A, 1: B, 2: C);
impl_dependencies!(4; 0: A, 1: B, 2: C, 3: D);
impl_dependencies!(5; 0: A, 1: B, 2: C, 3: D, 4: E);
impl_dependencies!(6; 0: A, 1: B, 2: C, 3: D, 4: E, 5: F);

/// Build a task node from a typed dependency list and a body.
///
/// The body runs once every dependency has completed, receiving their
/// results as a tuple of `Arc`s (`deps.results()`'s shape). It returns
/// [`Outcome::Ready`] for a directly computed value or
/// [`Outcome::Continue`] to hand this task's completion off to another
/// task; see [`Outcome`] for why that tag is explicit rather than
/// inferred.
///
/// A task with no dependencies (`deps = ()`) is submitted to the pool
/// immediately; the pool must already be running (see [`crate::init`]) or
/// the submission is silently dropped and logged as a warning, matching
/// [`crate::pool::schedule`]'s contract.
pub fn make_task<D, F, R>(deps: D, body: F) -> TaskHandle<R>
where
    D: Dependencies,
    F: FnOnce(D::Results) -> Outcome<R> + Send + 'static,
    R: Send + Sync + 'static,
{
    let pending = deps.pending_count();
    let deps_for_wiring = deps.clone();

    let boxed_body: Box<dyn FnOnce() -> Outcome<R> + Send> =
        Box::new(move || body(deps.results()));
    let handle = TaskHandle::new_node(pending, boxed_body);

    if pending > 0 {
        let notify_handle = handle.clone();
        let notify: Arc<dyn Fn() + Send + Sync> = Arc::new(move || notify_handle.signal_dependency());
        deps_for_wiring.wire(notify);
    }

    handle
}

/// Fan in a dynamic-length list of same-typed tasks into one task whose
/// result is every input's result, in the same order as `tasks`.
///
/// Returns [`TaskGraphError::EmptyWhenAll`] for an empty list rather than
/// an already-completed empty-result task: an empty fan-in is almost
/// always a caller bug, and a typed error surfaces it instead of quietly
/// producing a trivial task.
pub fn when_all<R: Send + Sync + 'static>(
    tasks: Vec<TaskHandle<R>>,
) -> Result<TaskHandle<Vec<Arc<R>>>> {
    if tasks.is_empty() {
        return Err(TaskGraphError::EmptyWhenAll);
    }

    let pending = tasks.len();
    let tasks_for_body = tasks.clone();
    let boxed_body: Box<dyn FnOnce() -> Outcome<Vec<Arc<R>>> + Send> = Box::new(move || {
        Outcome::Ready(tasks_for_body.iter().map(TaskHandle::result).collect())
    });
    let handle = TaskHandle::new_node(pending, boxed_body);

    let notify_handle = handle.clone();
    let notify: Arc<dyn Fn() + Send + Sync> = Arc::new(move || notify_handle.signal_dependency());
    for task in &tasks {
        let notify = notify.clone();
        task.on_ready(Box::new(move || notify()));
    }

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool;
    use parking_lot::Mutex;

    // make_task/when_all dispatch through the real process-wide pool, so
    // these tests start and stop it like pool.rs's own tests do, guarded
    // against the same singleton to avoid racing across test threads.
    static TEST_GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn zero_dependency_task_runs_on_the_pool() {
        let _guard = TEST_GUARD.lock();
        pool::init().unwrap();

        let task = make_task((), |()| Outcome::Ready(10));
        assert_eq!(*task.result(), 10);

        pool::shutdown().unwrap();
    }

    #[test]
    fn single_dependency_task_runs_after_its_dependency_fires() {
        let _guard = TEST_GUARD.lock();
        pool::init().unwrap();

        let a = make_task((), |()| Outcome::Ready(4));
        let task = make_task((a,), |(x,)| Outcome::Ready(*x * 10));
        assert_eq!(*task.result(), 40);

        pool::shutdown().unwrap();
    }

    #[test]
    fn two_dependency_task_combines_both_results() {
        let _guard = TEST_GUARD.lock();
        pool::init().unwrap();

        let a = make_task((), |()| Outcome::Ready(3));
        let b = make_task((), |()| Outcome::Ready(4));
        let task = make_task((a, b), |(x, y)| Outcome::Ready(*x + *y));
        assert_eq!(*task.result(), 7);

        pool::shutdown().unwrap();
    }

    #[test]
    fn dependency_already_fired_before_wiring_still_schedules() {
        let _guard = TEST_GUARD.lock();
        pool::init().unwrap();

        let a = make_task((), |()| Outcome::Ready(1));
        // Give `a` time to finish before anything depends on it, so
        // `make_task` below wires onto an already-fired holder and
        // exercises `ContinuationHolder::attach`'s inline-run path.
        let _ = a.result();
        let task = make_task((a,), |(x,)| Outcome::Ready(*x + 1));
        assert_eq!(*task.result(), 2);

        pool::shutdown().unwrap();
    }

    #[test]
    fn continuation_transfer_through_make_task() {
        let _guard = TEST_GUARD.lock();
        pool::init().unwrap();

        let outer: TaskHandle<i32> = make_task((), |()| {
            Outcome::Continue(make_task((), |()| Outcome::Ready(105)))
        });
        assert_eq!(*outer.result(), 105);

        pool::shutdown().unwrap();
    }

    #[test]
    fn when_all_preserves_input_order() {
        let _guard = TEST_GUARD.lock();
        pool::init().unwrap();

        let tasks: Vec<TaskHandle<i32>> = (1..=3)
            .map(|i| make_task((), move |()| Outcome::Ready(i)))
            .collect();
        let joined = when_all(tasks).unwrap();
        let results: Vec<i32> = joined.result().iter().map(|r| **r).collect();
        assert_eq!(results, vec![1, 2, 3]);

        pool::shutdown().unwrap();
    }

    #[test]
    fn when_all_rejects_empty_input() {
        let err = when_all::<i32>(Vec::new()).unwrap_err();
        assert!(matches!(err, TaskGraphError::EmptyWhenAll));
    }
}
