//! Map and consume: transform or observe a success value.

use crate::cell::FutureCell;
use crate::error::catch_failure;
use crate::exec::Exec;
use crate::types::Outcome;

impl<T: Clone + Send + 'static> FutureCell<T> {
    /// Derives a cell that applies `f` to this cell's success value.
    ///
    /// `f` runs under `exec` when the source succeeds. If the source fails
    /// or is cancelled, the derived cell fails or cancels identically and
    /// `f` is never invoked. A panic inside `f` fails the derived cell
    /// with a computation failure.
    ///
    /// # Example
    ///
    /// ```
    /// use futurecell::{Exec, FutureCell};
    ///
    /// let upper = FutureCell::succeeded("message".to_string())
    ///     .map(&Exec::Inline, |s| s.to_uppercase());
    /// assert_eq!(upper.wait().ok().as_deref(), Some("MESSAGE"));
    /// ```
    pub fn map<U, F>(&self, exec: &Exec, f: F) -> FutureCell<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let target = FutureCell::pending();
        let out = target.clone();
        let exec = exec.clone();
        self.on_settled(move |outcome| match outcome {
            Outcome::Ok(value) => {
                let fallback = out.clone();
                exec.run_or_cancel(&fallback, move || match catch_failure(move || f(value)) {
                    Ok(mapped) => {
                        out.complete(mapped);
                    }
                    Err(failure) => {
                        out.fail(failure);
                    }
                });
            }
            Outcome::Err(failure) => {
                out.fail(failure.into_upstream());
            }
            Outcome::Cancelled(reason) => {
                out.cancel_with(reason);
            }
        });
        target
    }

    /// Like [`map`](Self::map), but `f` returns nothing; the derived cell
    /// carries no value. Same propagation rules.
    pub fn consume<F>(&self, exec: &Exec, f: F) -> FutureCell<()>
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.map(exec, move |value| {
            f(value);
        })
    }
}
