//! Chain: dependent async pipelines with flattening.

use crate::cell::FutureCell;
use crate::error::catch_failure;
use crate::exec::Exec;
use crate::types::Outcome;

impl<T: Clone + Send + 'static> FutureCell<T> {
    /// Derives a cell from `f`, which maps this cell's success value to a
    /// *new* cell; the derived cell mirrors that inner cell's eventual
    /// outcome (flattening).
    ///
    /// If this cell fails or is cancelled, `f` is never invoked and the
    /// outcome propagates as in [`map`](Self::map). A panic inside `f`
    /// fails the derived cell. The inner cell's outcome is mirrored
    /// verbatim, including its failure tag.
    ///
    /// # Example
    ///
    /// ```
    /// use futurecell::{Exec, FutureCell};
    ///
    /// let result = FutureCell::succeeded(2)
    ///     .chain(&Exec::Inline, |v| FutureCell::succeeded(v * 10));
    /// assert_eq!(result.wait().ok(), Some(20));
    /// ```
    pub fn chain<U, F>(&self, exec: &Exec, f: F) -> FutureCell<U>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> FutureCell<U> + Send + 'static,
    {
        let target = FutureCell::pending();
        let out = target.clone();
        let exec = exec.clone();
        self.on_settled(move |outcome| match outcome {
            Outcome::Ok(value) => {
                let fallback = out.clone();
                exec.run_or_cancel(&fallback, move || match catch_failure(move || f(value)) {
                    Ok(inner) => {
                        let forward = out.clone();
                        inner.on_settled(move |inner_outcome| {
                            forward.settle(inner_outcome);
                        });
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
}
