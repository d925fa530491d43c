//! Property tests for the cell state machine and combinator laws.

use futurecell::{CancelReason, Exec, Failure, FutureCell, Outcome};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// A terminal transition applied to a cell.
#[derive(Debug, Clone)]
enum Transition {
    Complete(i32),
    Fail(String),
    Cancel,
}

fn arb_transition() -> impl Strategy<Value = Transition> {
    prop_oneof![
        any::<i32>().prop_map(Transition::Complete),
        "[a-z]{1,12}".prop_map(Transition::Fail),
        Just(Transition::Cancel),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Outcome<i32>> {
    prop_oneof![
        any::<i32>().prop_map(Outcome::Ok),
        "[a-z]{1,12}".prop_map(|m| Outcome::Err(Failure::computation(m))),
        Just(Outcome::Cancelled(CancelReason::timeout())),
    ]
}

fn apply(cell: &FutureCell<i32>, transition: &Transition) -> bool {
    match transition {
        Transition::Complete(v) => cell.complete(*v),
        Transition::Fail(m) => cell.fail(Failure::computation(m.clone())),
        Transition::Cancel => cell.cancel(),
    }
}

fn cell_with(outcome: &Outcome<i32>) -> FutureCell<i32> {
    match outcome {
        Outcome::Ok(v) => FutureCell::succeeded(*v),
        Outcome::Err(f) => FutureCell::failed(f.clone()),
        Outcome::Cancelled(r) => FutureCell::cancelled(r.clone()),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Exactly the first transition in any sequence takes effect; the rest
    /// return false and leave the observable state untouched.
    #[test]
    fn first_transition_wins(transitions in prop::collection::vec(arb_transition(), 1..8)) {
        let cell = FutureCell::pending();

        prop_assert!(apply(&cell, &transitions[0]));
        let settled = cell.wait_outcome();

        for later in &transitions[1..] {
            prop_assert!(!apply(&cell, later));
        }

        // The observed outcome matches the first transition, before and after.
        let still = cell.wait_outcome();
        prop_assert_eq!(settled.severity(), still.severity());
        match (&transitions[0], &still) {
            (Transition::Complete(v), Outcome::Ok(observed)) => prop_assert_eq!(v, observed),
            (Transition::Fail(m), Outcome::Err(failure)) => {
                prop_assert_eq!(m.as_str(), failure.message());
            }
            (Transition::Cancel, Outcome::Cancelled(_)) => {}
            (transition, outcome) => {
                return Err(TestCaseError::fail(format!(
                    "state drifted: {transition:?} became {outcome:?}"
                )));
            }
        }
    }

    /// `peek` on a pending cell always returns the default.
    #[test]
    fn peek_pending_returns_default(default in any::<i32>()) {
        let cell: FutureCell<i32> = FutureCell::pending();
        prop_assert_eq!(cell.peek(default), default);
    }

    /// Mapping the identity function preserves the outcome's severity and
    /// its success value.
    #[test]
    fn map_identity_preserves_outcome(outcome in arb_outcome()) {
        let source = cell_with(&outcome);
        let mapped = source.map(&Exec::Inline, |v| v);

        let derived = mapped.wait_outcome();
        prop_assert_eq!(derived.severity(), outcome.severity());
        if let (Outcome::Ok(expected), Outcome::Ok(observed)) = (&outcome, &derived) {
            prop_assert_eq!(expected, observed);
        }
    }

    /// `map` composes: `map(f).map(g)` equals `map(g . f)` on success.
    #[test]
    fn map_composes(v in any::<i16>()) {
        let v = i32::from(v);
        let staged = FutureCell::succeeded(v)
            .map(&Exec::Inline, |x| x + 3)
            .map(&Exec::Inline, |x| x * 2);
        let fused = FutureCell::succeeded(v).map(&Exec::Inline, |x| (x + 3) * 2);
        prop_assert_eq!(staged.wait().ok(), fused.wait().ok());
    }

    /// `recover(f)` on a failed cell yields exactly `f(error)`.
    #[test]
    fn recover_round_trip(message in "[a-z]{1,16}") {
        let failed: FutureCell<String> =
            FutureCell::failed(Failure::computation(message.clone()));
        let healed = failed.recover(&Exec::Inline, |error| {
            error.failure().map_or_else(String::new, |f| f.message().to_string())
        });
        prop_assert_eq!(healed.wait().ok(), Some(message));
    }

    /// `combine` succeeds iff both inputs succeed.
    #[test]
    fn combine_succeeds_iff_both_do(a in arb_outcome(), b in arb_outcome()) {
        let joined = cell_with(&a).combine(&cell_with(&b), &Exec::Inline, |x, y| (x, y));
        let result = joined.wait_outcome();
        prop_assert_eq!(result.is_ok(), a.is_ok() && b.is_ok());
        if let (Outcome::Ok(x), Outcome::Ok(y), Outcome::Ok(pair)) = (&a, &b, &result) {
            prop_assert_eq!((*x, *y), *pair);
        }
    }

    /// `wait_any` over a set containing at least one success never fails,
    /// and its value is one of the successes.
    #[test]
    fn wait_any_yields_some_success(outcomes in prop::collection::vec(arb_outcome(), 1..6)) {
        let cells: Vec<_> = outcomes.iter().map(cell_with).collect();
        let winner = futurecell::wait_any(&cells);
        let result = winner.wait_outcome();

        let successes: Vec<i32> = outcomes
            .iter()
            .filter_map(|o| match o {
                Outcome::Ok(v) => Some(*v),
                _ => None,
            })
            .collect();
        if successes.is_empty() {
            prop_assert!(!result.is_ok());
        } else {
            match result {
                Outcome::Ok(v) => prop_assert!(successes.contains(&v)),
                other => {
                    return Err(TestCaseError::fail(format!(
                        "expected a success, got {other:?}"
                    )));
                }
            }
        }
    }

    /// `wait_all` resolves successfully iff no input failed.
    #[test]
    fn wait_all_resolves_iff_no_failure(outcomes in prop::collection::vec(arb_outcome(), 0..6)) {
        let cells: Vec<_> = outcomes.iter().map(cell_with).collect();
        let done = futurecell::wait_all(&cells);
        let all_ok = outcomes.iter().all(Outcome::is_ok);
        prop_assert_eq!(done.wait_outcome().is_ok(), all_ok);
    }
}
