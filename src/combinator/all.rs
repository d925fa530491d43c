//! Wait-all: complete only when every input is terminal.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cell::FutureCell;
use crate::types::Outcome;

/// Aggregate bookkeeping for [`wait_all`].
struct AllSlot {
    remaining: usize,
    first_failure: Option<Outcome<()>>,
}

/// Derives a cell that completes (with no value) once every input has
/// reached a terminal state.
///
/// Fails with the *first encountered* failure among the inputs, but never
/// short-circuits: all inputs finish (and their side effects complete)
/// before the result settles — accumulate-then-report, not fail-fast.
/// An empty input slice resolves immediately.
///
/// When every input is already terminal at call time, the result resolves
/// synchronously before this function returns.
///
/// # Example
///
/// ```
/// use futurecell::{wait_all, FutureCell};
///
/// let cells = [FutureCell::succeeded(1), FutureCell::succeeded(2)];
/// assert!(wait_all(&cells).wait().is_ok());
/// ```
#[must_use]
pub fn wait_all<T: Clone + Send + 'static>(cells: &[FutureCell<T>]) -> FutureCell<()> {
    let target = FutureCell::pending();
    if cells.is_empty() {
        target.complete(());
        return target;
    }

    let slot = Arc::new(Mutex::new(AllSlot {
        remaining: cells.len(),
        first_failure: None,
    }));

    for cell in cells {
        let out = target.clone();
        let slot = Arc::clone(&slot);
        cell.on_settled(move |outcome| {
            let report = {
                let mut slot = slot.lock();
                if slot.first_failure.is_none() {
                    slot.first_failure = match &outcome {
                        Outcome::Ok(_) => None,
                        Outcome::Err(failure) => {
                            Some(Outcome::Err(failure.clone().into_upstream()))
                        }
                        Outcome::Cancelled(reason) => {
                            Some(Outcome::Cancelled(reason.clone()))
                        }
                    };
                }
                slot.remaining -= 1;
                if slot.remaining == 0 {
                    Some(slot.first_failure.take().unwrap_or(Outcome::Ok(())))
                } else {
                    None
                }
            };
            if let Some(outcome) = report {
                out.settle(outcome);
            }
        });
    }

    target
}
