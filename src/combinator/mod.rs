//! Combinators: derive new cells from existing ones.
//!
//! Every combinator takes an [`Exec`](crate::Exec) binding that decides
//! where the continuation runs, registers a dependent on its source
//! cell(s), and returns a new pending cell that settles when the
//! continuation (or a propagated failure) does. None of them block.
//!
//! - [`map`](crate::FutureCell::map) / [`consume`](crate::FutureCell::consume):
//!   transform (or observe) the success value
//! - [`chain`](crate::FutureCell::chain): dependent async pipelines
//!   (flattening)
//! - [`combine`](crate::FutureCell::combine): wait for two successes,
//!   apply a binary function
//! - [`race`](crate::FutureCell::race): first success wins
//! - [`wait_all`] / [`wait_any`]: aggregate over a slice of cells
//! - [`recover`](crate::FutureCell::recover) /
//!   [`handle`](crate::FutureCell::handle): intercept failures
//!
//! # Propagation
//!
//! Failures propagate through every combinator unless intercepted by
//! `recover`/`handle`. A propagated failure is re-tagged
//! [`Upstream`](crate::FailureKind::Upstream) with its root-cause message
//! intact; cancellation propagates with its `Cancelled` tag untouched.
//! If the binding dispatches to a pool that has already shut down, the
//! derived cell is cancelled with a shutdown reason instead of pending
//! forever.

pub mod all;
pub mod any;
pub mod chain;
pub mod combine;
pub mod map;
pub mod race;
pub mod recover;

pub use all::wait_all;
pub use any::wait_any;
