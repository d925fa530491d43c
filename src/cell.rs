//! The promise/future cell: an exactly-once tagged-state container.
//!
//! [`FutureCell`] holds the eventual result of a computation. It is created
//! `Pending` and transitions to exactly one terminal [`Outcome`]: succeeded,
//! failed, or cancelled. Once terminal, the state is immutable; later
//! transition attempts are silent no-ops that return `false`.
//!
//! # Sharing
//!
//! A `FutureCell` is a cheap clonable handle (`Arc` inner). Whoever created
//! it typically keeps one handle to settle it; any number of dependents may
//! hold handles to observe it.
//!
//! # Dependents
//!
//! Continuations registered before settlement are queued; settlement drains
//! the queue and invokes every continuation outside the state lock.
//! Continuations registered after settlement run immediately on the
//! registering thread. No ordering is promised between dependents.
//!
//! # Blocking
//!
//! Only the `wait` family blocks. `peek`, settlement, and dependent
//! registration never block beyond the internal mutex.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{Failure, Result};
use crate::types::{CancelReason, Outcome};

/// A continuation invoked with the settled outcome.
type Dependent<T> = Box<dyn FnOnce(Outcome<T>) + Send>;

/// A handle to an eventually available result.
///
/// See the [module docs](self) for the state machine and sharing rules.
///
/// # Example
///
/// ```
/// use futurecell::FutureCell;
///
/// let cell = FutureCell::pending();
/// assert!(cell.complete(7));
/// assert!(!cell.cancel());
/// assert_eq!(cell.peek(0), 7);
/// ```
pub struct FutureCell<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for FutureCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for FutureCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        let (name, dependents) = match &*state {
            State::Pending(deps) => ("pending", deps.len()),
            State::Settled(outcome) => {
                let name = match outcome {
                    Outcome::Ok(_) => "succeeded",
                    Outcome::Err(_) => "failed",
                    Outcome::Cancelled(_) => "cancelled",
                };
                (name, 0)
            }
        };
        f.debug_struct("FutureCell")
            .field("state", &name)
            .field("dependents", &dependents)
            .finish()
    }
}

struct Inner<T> {
    state: Mutex<State<T>>,
    /// Signalled on settlement; waiters in `wait*` park here.
    settled: Condvar,
}

enum State<T> {
    Pending(Vec<Dependent<T>>),
    Settled(Outcome<T>),
}

impl<T> Default for FutureCell<T> {
    fn default() -> Self {
        Self::pending()
    }
}

impl<T> FutureCell<T> {
    /// Creates a new pending cell.
    #[must_use]
    pub fn pending() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::Pending(Vec::new())),
                settled: Condvar::new(),
            }),
        }
    }

    /// Creates a cell already settled with the given value.
    #[must_use]
    pub fn succeeded(value: T) -> Self {
        Self::settled_with(Outcome::Ok(value))
    }

    /// Creates a cell already settled with the given failure.
    #[must_use]
    pub fn failed(failure: Failure) -> Self {
        Self::settled_with(Outcome::Err(failure))
    }

    /// Creates a cell already cancelled with the given reason.
    #[must_use]
    pub fn cancelled(reason: CancelReason) -> Self {
        Self::settled_with(Outcome::Cancelled(reason))
    }

    fn settled_with(outcome: Outcome<T>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::Settled(outcome)),
                settled: Condvar::new(),
            }),
        }
    }

    /// Returns true if the cell has not yet settled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(&*self.inner.state.lock(), State::Pending(_))
    }

    /// Returns true if the cell has reached a terminal state.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }
}

impl<T: Clone> FutureCell<T> {
    /// Transitions `Pending -> Succeeded`.
    ///
    /// Returns `false` (a silent no-op) if the cell is already terminal.
    /// Triggers all registered dependents.
    pub fn complete(&self, value: T) -> bool {
        self.settle(Outcome::Ok(value))
    }

    /// Transitions `Pending -> Failed`.
    ///
    /// Returns `false` if the cell is already terminal.
    pub fn fail(&self, failure: Failure) -> bool {
        self.settle(Outcome::Err(failure))
    }

    /// Transitions `Pending -> Cancelled` with the default (user) reason.
    ///
    /// Equivalent in effect to failing with a cancellation-tagged payload:
    /// dependents observe it exactly as they would a failure, except the
    /// `Cancelled` tag survives. Returns `false` if already terminal.
    ///
    /// Cancellation is cooperative: it forces only this cell's state and
    /// does not interrupt in-flight work.
    pub fn cancel(&self) -> bool {
        self.cancel_with(CancelReason::default())
    }

    /// Transitions `Pending -> Cancelled` with an explicit reason.
    pub fn cancel_with(&self, reason: CancelReason) -> bool {
        self.settle(Outcome::Cancelled(reason))
    }

    /// Settles the cell with the given outcome.
    ///
    /// Exactly one settlement takes effect; concurrent callers race and
    /// the losers get `false`. Dependents run outside the lock, on the
    /// settling thread, each with its own copy of the outcome.
    pub(crate) fn settle(&self, outcome: Outcome<T>) -> bool {
        let label = match &outcome {
            Outcome::Ok(_) => "succeeded",
            Outcome::Err(_) => "failed",
            Outcome::Cancelled(_) => "cancelled",
        };
        let dependents = {
            let mut state = self.inner.state.lock();
            if matches!(&*state, State::Settled(_)) {
                return false;
            }
            let previous = std::mem::replace(&mut *state, State::Settled(outcome.clone()));
            self.inner.settled.notify_all();
            match previous {
                State::Pending(deps) => deps,
                State::Settled(_) => Vec::new(),
            }
        };
        tracing::trace!(state = label, dependents = dependents.len(), "cell settled");
        for dependent in dependents {
            dependent(outcome.clone());
        }
        true
    }

    /// Registers a continuation on this cell.
    ///
    /// Before settlement the continuation is queued; after settlement it
    /// runs immediately on the calling thread. Queueing and settlement are
    /// mutually exclusive, so a dependent is never both recorded and missed.
    pub(crate) fn on_settled(&self, dependent: impl FnOnce(Outcome<T>) + Send + 'static) {
        let mut dependent: Option<Dependent<T>> = Some(Box::new(dependent));
        let ready = {
            let mut state = self.inner.state.lock();
            match &mut *state {
                State::Pending(deps) => {
                    if let Some(dep) = dependent.take() {
                        deps.push(dep);
                    }
                    None
                }
                State::Settled(outcome) => Some(outcome.clone()),
            }
        };
        if let (Some(outcome), Some(dep)) = (ready, dependent.take()) {
            dep(outcome);
        }
    }

    /// Returns the current value if succeeded, else `default`.
    ///
    /// Never blocks, never panics.
    #[must_use]
    pub fn peek(&self, default: T) -> T {
        let state = self.inner.state.lock();
        match &*state {
            State::Settled(Outcome::Ok(value)) => value.clone(),
            _ => default,
        }
    }

    /// Blocks the calling thread until the cell settles, then returns the
    /// value or the composed [`Error`](crate::Error) identifying the root
    /// cause.
    pub fn wait(&self) -> Result<T> {
        self.wait_outcome().into_result()
    }

    /// Blocks until the cell settles, returning the tagged outcome.
    ///
    /// Use this instead of [`wait`](Self::wait) when the caller wants an
    /// explicit failure signal rather than a propagated error.
    #[must_use]
    pub fn wait_outcome(&self) -> Outcome<T> {
        let mut state = self.inner.state.lock();
        loop {
            if let State::Settled(outcome) = &*state {
                return outcome.clone();
            }
            self.inner.settled.wait(&mut state);
        }
    }

    /// Blocks until the cell settles or the timeout elapses.
    ///
    /// Returns `None` if the cell is still pending when the timeout fires.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Outcome<T>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.inner.state.lock();
        loop {
            if let State::Settled(outcome) = &*state {
                return Some(outcome.clone());
            }
            if self.inner.settled.wait_until(&mut state, deadline).timed_out() {
                if let State::Settled(outcome) = &*state {
                    return Some(outcome.clone());
                }
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn complete_then_fail_is_noop() {
        let cell = FutureCell::pending();
        assert!(cell.complete(1));
        assert!(!cell.fail(Failure::computation("late")));
        assert!(!cell.cancel());
        assert_eq!(cell.peek(0), 1);
    }

    #[test]
    fn fail_then_complete_is_noop() {
        let cell = FutureCell::pending();
        assert!(cell.fail(Failure::computation("boom")));
        assert!(!cell.complete(1));
        assert!(cell.wait_outcome().is_err());
    }

    #[test]
    fn cancel_wins_when_first() {
        let cell: FutureCell<i32> = FutureCell::pending();
        assert!(cell.cancel());
        assert!(!cell.complete(1));
        assert!(cell.wait_outcome().is_cancelled());
    }

    #[test]
    fn peek_on_pending_returns_default() {
        let cell: FutureCell<i32> = FutureCell::pending();
        assert_eq!(cell.peek(99), 99);
    }

    #[test]
    fn peek_on_failed_returns_default() {
        let cell: FutureCell<i32> = FutureCell::failed(Failure::computation("boom"));
        assert_eq!(cell.peek(99), 99);
    }

    #[test]
    fn pre_settled_constructors() {
        assert_eq!(FutureCell::succeeded(5).peek(0), 5);
        assert!(FutureCell::<i32>::failed(Failure::computation("x"))
            .wait_outcome()
            .is_err());
        assert!(FutureCell::<i32>::cancelled(CancelReason::timeout())
            .wait_outcome()
            .is_cancelled());
    }

    #[test]
    fn wait_returns_value() {
        let cell = FutureCell::pending();
        let waiter = cell.clone();
        let handle = thread::spawn(move || waiter.wait());
        thread::sleep(Duration::from_millis(10));
        assert!(cell.complete(42));
        assert_eq!(handle.join().expect("waiter panicked").ok(), Some(42));
    }

    #[test]
    fn wait_timeout_on_pending_returns_none() {
        let cell: FutureCell<i32> = FutureCell::pending();
        assert!(cell.wait_timeout(Duration::from_millis(20)).is_none());
    }

    #[test]
    fn wait_timeout_on_settled_returns_immediately() {
        let cell = FutureCell::succeeded(1);
        let outcome = cell.wait_timeout(Duration::from_secs(5));
        assert!(matches!(outcome, Some(Outcome::Ok(1))));
    }

    #[test]
    fn dependents_run_on_settlement() {
        let cell = FutureCell::pending();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            cell.on_settled(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        cell.complete(1);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn late_dependent_runs_immediately() {
        let cell = FutureCell::succeeded(7);
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        cell.on_settled(move |outcome| {
            assert!(outcome.is_ok());
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_settlers_exactly_one_wins() {
        for _ in 0..50 {
            let cell: FutureCell<i32> = FutureCell::pending();
            let wins = Arc::new(AtomicUsize::new(0));
            let mut handles = Vec::new();
            for i in 0..4 {
                let cell = cell.clone();
                let wins = Arc::clone(&wins);
                handles.push(thread::spawn(move || {
                    let won = match i % 3 {
                        0 => cell.complete(i),
                        1 => cell.fail(Failure::computation("racer")),
                        _ => cell.cancel(),
                    };
                    if won {
                        wins.fetch_add(1, Ordering::SeqCst);
                    }
                }));
            }
            for handle in handles {
                handle.join().expect("settler panicked");
            }
            assert_eq!(wins.load(Ordering::SeqCst), 1);
            assert!(cell.is_settled());
        }
    }

    #[test]
    fn debug_reports_state() {
        let cell: FutureCell<i32> = FutureCell::pending();
        assert!(format!("{cell:?}").contains("pending"));
        cell.complete(1);
        assert!(format!("{cell:?}").contains("succeeded"));
    }
}
