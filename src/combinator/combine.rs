//! Combine: wait for two successes, apply a binary function.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cell::FutureCell;
use crate::error::catch_failure;
use crate::exec::Exec;
use crate::types::Outcome;

/// Slot for the two success values and the pending binary function.
struct Pair<T, U, F> {
    left: Option<T>,
    right: Option<U>,
    f: Option<F>,
}

impl<T: Clone + Send + 'static> FutureCell<T> {
    /// Derives a cell that waits for both this cell and `other` to succeed,
    /// then applies `f` to both values under `exec`.
    ///
    /// If either input fails or is cancelled, the derived cell settles with
    /// whichever failure is observed first (the exactly-once settlement of
    /// the derived cell is the tie-break). When both inputs are already
    /// failed at call time, this cell's failure takes precedence: it is
    /// subscribed first.
    ///
    /// # Example
    ///
    /// ```
    /// use futurecell::{Exec, FutureCell};
    ///
    /// let joined = FutureCell::succeeded(2)
    ///     .combine(&FutureCell::succeeded(3), &Exec::Inline, |a, b| a * b);
    /// assert_eq!(joined.wait().ok(), Some(6));
    /// ```
    pub fn combine<U, R, F>(&self, other: &FutureCell<U>, exec: &Exec, f: F) -> FutureCell<R>
    where
        U: Clone + Send + 'static,
        R: Clone + Send + 'static,
        F: FnOnce(T, U) -> R + Send + 'static,
    {
        let target = FutureCell::pending();
        let pair = Arc::new(Mutex::new(Pair {
            left: None,
            right: None,
            f: Some(f),
        }));

        {
            let out = target.clone();
            let pair = Arc::clone(&pair);
            let exec = exec.clone();
            self.on_settled(move |outcome| match outcome {
                Outcome::Ok(value) => {
                    pair.lock().left = Some(value);
                    try_apply(&pair, &exec, &out);
                }
                Outcome::Err(failure) => {
                    out.fail(failure.into_upstream());
                }
                Outcome::Cancelled(reason) => {
                    out.cancel_with(reason);
                }
            });
        }
        {
            let out = target.clone();
            let pair = Arc::clone(&pair);
            let exec = exec.clone();
            other.on_settled(move |outcome| match outcome {
                Outcome::Ok(value) => {
                    pair.lock().right = Some(value);
                    try_apply(&pair, &exec, &out);
                }
                Outcome::Err(failure) => {
                    out.fail(failure.into_upstream());
                }
                Outcome::Cancelled(reason) => {
                    out.cancel_with(reason);
                }
            });
        }

        target
    }
}

/// Applies the binary function once both values have arrived.
fn try_apply<T, U, R, F>(pair: &Arc<Mutex<Pair<T, U, F>>>, exec: &Exec, out: &FutureCell<R>)
where
    T: Send + 'static,
    U: Send + 'static,
    R: Clone + Send + 'static,
    F: FnOnce(T, U) -> R + Send + 'static,
{
    let ready = {
        let mut slot = pair.lock();
        if slot.left.is_some() && slot.right.is_some() {
            match (slot.left.take(), slot.right.take(), slot.f.take()) {
                (Some(left), Some(right), Some(f)) => Some((left, right, f)),
                _ => None,
            }
        } else {
            None
        }
    };
    if let Some((left, right, f)) = ready {
        let job_out = out.clone();
        exec.run_or_cancel(out, move || match catch_failure(move || f(left, right)) {
            Ok(value) => {
                job_out.complete(value);
            }
            Err(failure) => {
                job_out.fail(failure);
            }
        });
    }
}
