//! Conformance tests for the cell state machine under concurrency.
//!
//! Validates the core invariants:
//! - **Exactly-once settlement**: concurrent settlers race, one wins
//! - **No missed dependents**: a continuation attached concurrently with
//!   settlement is always invoked exactly once
//! - **Non-blocking reads**: `peek` never blocks or panics

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use futurecell::{Failure, FutureCell};

#[test]
fn concurrent_settlers_exactly_one_wins() {
    for round in 0..200 {
        let cell: FutureCell<usize> = FutureCell::pending();
        let wins = Arc::new(AtomicUsize::new(0));
        let start = Arc::new(Barrier::new(6));

        let mut handles = Vec::new();
        for i in 0..6 {
            let cell = cell.clone();
            let wins = Arc::clone(&wins);
            let start = Arc::clone(&start);
            handles.push(thread::spawn(move || {
                start.wait();
                let won = match i % 3 {
                    0 => cell.complete(round),
                    1 => cell.fail(Failure::computation("contender")),
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

        assert_eq!(wins.load(Ordering::SeqCst), 1, "round {round}");
        assert!(cell.is_settled());
    }
}

#[test]
fn settled_state_is_immutable() {
    let cell = FutureCell::pending();
    assert!(cell.complete(1));

    // Later transitions of every kind are silent no-ops.
    assert!(!cell.complete(2));
    assert!(!cell.fail(Failure::computation("late")));
    assert!(!cell.cancel());
    assert_eq!(cell.peek(0), 1);
}

#[test]
fn dependents_attached_concurrently_with_settlement_all_run() {
    for _ in 0..100 {
        let cell: FutureCell<i32> = FutureCell::pending();
        let invoked = Arc::new(AtomicUsize::new(0));
        let start = Arc::new(Barrier::new(5));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cell = cell.clone();
            let invoked = Arc::clone(&invoked);
            let start = Arc::clone(&start);
            handles.push(thread::spawn(move || {
                start.wait();
                for _ in 0..8 {
                    let invoked = Arc::clone(&invoked);
                    cell.on_settled_count(&invoked);
                }
            }));
        }
        {
            let cell = cell.clone();
            let start = Arc::clone(&start);
            handles.push(thread::spawn(move || {
                start.wait();
                cell.complete(1);
            }));
        }
        for handle in handles {
            handle.join().expect("thread panicked");
        }

        // Every attached dependent ran exactly once, whether it was queued
        // before settlement or invoked immediately after.
        assert_eq!(invoked.load(Ordering::SeqCst), 32);
    }
}

/// Attach-a-counting-dependent helper, expressed through the public
/// combinator surface so the conformance suite stays on the public API.
trait CountSettled {
    fn on_settled_count(&self, counter: &Arc<AtomicUsize>);
}

impl CountSettled for FutureCell<i32> {
    fn on_settled_count(&self, counter: &Arc<AtomicUsize>) {
        let counter = Arc::clone(counter);
        let _ = self.handle(&futurecell::Exec::Inline, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }
}

#[test]
fn many_waiters_all_observe_the_value() {
    let cell: FutureCell<i32> = FutureCell::pending();
    let mut handles = Vec::new();
    for _ in 0..8 {
        let cell = cell.clone();
        handles.push(thread::spawn(move || cell.wait().ok()));
    }

    thread::sleep(Duration::from_millis(20));
    assert!(cell.complete(77));

    for handle in handles {
        assert_eq!(handle.join().expect("waiter panicked"), Some(77));
    }
}

#[test]
fn peek_is_nonblocking_while_contended() {
    let cell: FutureCell<i32> = FutureCell::pending();
    let settler = {
        let cell = cell.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            cell.complete(5);
        })
    };

    // Pending peeks return the default without waiting for the settler.
    for _ in 0..100 {
        let _ = cell.peek(-1);
    }
    settler.join().expect("settler panicked");
    assert_eq!(cell.peek(-1), 5);
}
