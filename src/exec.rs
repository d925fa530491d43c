//! Execution binding: where a continuation runs.
//!
//! Every combinator call picks one of two modes:
//!
//! - [`Exec::Inline`]: the continuation runs synchronously on whatever
//!   thread performs the triggering settlement. If the source is already
//!   terminal at registration time, it runs on the registering thread.
//! - [`Exec::Dispatch`]: the continuation is handed to a [`WorkerPool`]
//!   and the combinator returns immediately.
//!
//! The core owns no scheduler of its own; dispatching requires an
//! explicitly constructed pool handle. No ordering is guaranteed between
//! continuations bound to different executions.
//!
//! Dispatching to a pool that has shut down refuses the job; combinators
//! translate that refusal into a shutdown cancellation of the derived
//! cell, so a waiter is never stranded on a continuation that will not
//! run.
//!
//! [`WorkerPool`]: crate::pool::WorkerPool

use crate::cell::FutureCell;
use crate::pool::WorkerPoolHandle;
use crate::types::CancelReason;

/// Where a continuation runs: inline on the settling thread, or dispatched
/// to a worker pool.
#[derive(Debug, Clone)]
pub enum Exec {
    /// Run synchronously on the settling (or registering) thread.
    Inline,
    /// Queue on the given worker pool.
    Dispatch(WorkerPoolHandle),
}

impl Exec {
    /// Runs a job under this binding.
    ///
    /// Returns `false` if the job was refused (dispatch to a shut-down
    /// pool); a refused job is dropped without running.
    pub(crate) fn run<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            Self::Inline => {
                job();
                true
            }
            Self::Dispatch(pool) => pool.submit(job),
        }
    }

    /// Runs a job under this binding; when the job is refused, cancels
    /// `fallback` with a shutdown reason so its waiters are not stranded.
    pub(crate) fn run_or_cancel<T, F>(&self, fallback: &FutureCell<T>, job: F)
    where
        T: Clone,
        F: FnOnce() + Send + 'static,
    {
        if !self.run(job) {
            fallback.cancel_with(CancelReason::shutdown());
        }
    }
}
