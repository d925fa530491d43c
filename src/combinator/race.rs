//! Race: first successful value wins.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cell::FutureCell;
use crate::error::catch_failure;
use crate::exec::Exec;
use crate::types::Outcome;

/// Shared race bookkeeping: the pending continuation and the loss count.
struct RaceSlot<F> {
    f: Option<F>,
    losses: usize,
}

impl<T: Clone + Send + 'static> FutureCell<T> {
    /// Derives a cell that applies `f` to whichever of this cell or `other`
    /// succeeds first, regardless of arrival order.
    ///
    /// A failure on one side does not settle the result: the race keeps
    /// waiting for the other side. Only when both inputs have failed does
    /// the derived cell fail, with the last observed failure. Under
    /// single-threaded settlement, simultaneous completion breaks ties in
    /// source-then-other declaration order.
    ///
    /// # Example
    ///
    /// ```
    /// use futurecell::{Exec, FutureCell};
    ///
    /// let winner = FutureCell::succeeded("fast")
    ///     .race(&FutureCell::pending(), &Exec::Inline, str::to_uppercase);
    /// assert_eq!(winner.wait().ok().as_deref(), Some("FAST"));
    /// ```
    pub fn race<R, F>(&self, other: &FutureCell<T>, exec: &Exec, f: F) -> FutureCell<R>
    where
        R: Clone + Send + 'static,
        F: FnOnce(T) -> R + Send + 'static,
    {
        let target = FutureCell::pending();
        let slot = Arc::new(Mutex::new(RaceSlot {
            f: Some(f),
            losses: 0,
        }));

        for source in [self, other] {
            let out = target.clone();
            let slot = Arc::clone(&slot);
            let exec = exec.clone();
            source.on_settled(move |outcome| match outcome {
                Outcome::Ok(value) => {
                    // Only the first success takes the continuation.
                    let f = slot.lock().f.take();
                    if let Some(f) = f {
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
                }
                loss => {
                    let both_failed = {
                        let mut slot = slot.lock();
                        slot.losses += 1;
                        slot.losses == 2
                    };
                    if both_failed {
                        match loss {
                            Outcome::Err(failure) => {
                                out.fail(failure.into_upstream());
                            }
                            Outcome::Cancelled(reason) => {
                                out.cancel_with(reason);
                            }
                            Outcome::Ok(_) => {}
                        }
                    }
                }
            });
        }

        target
    }
}
