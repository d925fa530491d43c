//! Recover and handle: intercept failures.

use crate::cell::FutureCell;
use crate::error::{catch_failure, Error};
use crate::exec::Exec;

impl<T: Clone + Send + 'static> FutureCell<T> {
    /// Derives a cell that converts a failed or cancelled source into a
    /// success by applying `f` to the composed error.
    ///
    /// A successful source passes through untouched and `f` is never
    /// invoked. A panic inside `f` fails the derived cell.
    ///
    /// # Example
    ///
    /// ```
    /// use futurecell::{Exec, Failure, FutureCell};
    ///
    /// let healed = FutureCell::<String>::failed(Failure::computation("boom"))
    ///     .recover(&Exec::Inline, |e| format!("fallback after {e}"));
    /// assert!(healed.wait().is_ok());
    /// ```
    pub fn recover<F>(&self, exec: &Exec, f: F) -> FutureCell<T>
    where
        F: FnOnce(Error) -> T + Send + 'static,
    {
        let target = FutureCell::pending();
        let out = target.clone();
        let exec = exec.clone();
        self.on_settled(move |outcome| match outcome.as_error() {
            None => {
                out.settle(outcome);
            }
            Some(error) => {
                let fallback = out.clone();
                exec.run_or_cancel(&fallback, move || match catch_failure(move || f(error)) {
                    Ok(value) => {
                        out.complete(value);
                    }
                    Err(failure) => {
                        out.fail(failure);
                    }
                });
            }
        });
        target
    }

    /// Derives a cell that applies `f` to either outcome — the success
    /// value or the composed error — always producing a success (unless
    /// `f` itself panics).
    pub fn handle<R, F>(&self, exec: &Exec, f: F) -> FutureCell<R>
    where
        R: Clone + Send + 'static,
        F: FnOnce(crate::error::Result<T>) -> R + Send + 'static,
    {
        let target = FutureCell::pending();
        let out = target.clone();
        let exec = exec.clone();
        self.on_settled(move |outcome| {
            let result = outcome.into_result();
            let fallback = out.clone();
            exec.run_or_cancel(&fallback, move || match catch_failure(move || f(result)) {
                Ok(value) => {
                    out.complete(value);
                }
                Err(failure) => {
                    out.fail(failure);
                }
            });
        });
        target
    }
}
