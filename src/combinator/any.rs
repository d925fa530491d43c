//! Wait-any: first success wins.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::cell::FutureCell;
use crate::error::Failure;
use crate::types::Outcome;

/// Aggregate bookkeeping for [`wait_any`].
struct AnySlot<T> {
    remaining: usize,
    last_failure: Option<Outcome<T>>,
}

/// Derives a cell that completes with the value of the first input to
/// *succeed*, regardless of arrival order.
///
/// Failures are held back: only when every input has failed does the
/// result fail, with the last observed failure. An empty input slice fails
/// immediately (a never-resolving cell would strand its waiters).
///
/// When every input is already terminal at call time, the result resolves
/// synchronously before this function returns.
///
/// # Example
///
/// ```
/// use futurecell::{wait_any, FutureCell};
///
/// let cells = [FutureCell::pending(), FutureCell::succeeded(9)];
/// assert_eq!(wait_any(&cells).wait().ok(), Some(9));
/// ```
#[must_use]
pub fn wait_any<T: Clone + Send + 'static>(cells: &[FutureCell<T>]) -> FutureCell<T> {
    let target = FutureCell::pending();
    if cells.is_empty() {
        target.fail(Failure::computation("wait_any over an empty input set"));
        return target;
    }

    let slot = Arc::new(Mutex::new(AnySlot {
        remaining: cells.len(),
        last_failure: None,
    }));

    for cell in cells {
        let out = target.clone();
        let slot = Arc::clone(&slot);
        cell.on_settled(move |outcome| match outcome {
            Outcome::Ok(value) => {
                out.complete(value);
            }
            Outcome::Err(failure) => {
                record_loss(&slot, Outcome::Err(failure.into_upstream()), &out);
            }
            Outcome::Cancelled(reason) => {
                record_loss(&slot, Outcome::Cancelled(reason), &out);
            }
        });
    }

    target
}

/// Records one lost input; the last loss settles the target.
fn record_loss<T: Clone>(
    slot: &Arc<Mutex<AnySlot<T>>>,
    loss: Outcome<T>,
    out: &FutureCell<T>,
) {
    let report = {
        let mut slot = slot.lock();
        slot.remaining -= 1;
        slot.last_failure = Some(loss);
        if slot.remaining == 0 {
            slot.last_failure.take()
        } else {
            None
        }
    };
    if let Some(outcome) = report {
        out.settle(outcome);
    }
}
