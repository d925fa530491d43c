//! Error types and error handling strategy.
//!
//! Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Errors compose with the [`Outcome`](crate::Outcome) severity lattice
//! - Continuation panics are isolated and converted to
//!   [`Failure::computation`]
//! - Failures propagating through combinators are re-tagged
//!   [`FailureKind::Upstream`] with the root-cause message preserved
//!
//! # Error Taxonomy
//!
//! - **Computation**: a continuation raised (panicked)
//! - **Upstream**: a failure propagated from a dependency
//! - **Cancelled**: the cell was explicitly cancelled
//!
//! The first two are [`Failure`] kinds; cancellation keeps its own tag all
//! the way to the caller so "gave up" stays distinguishable from "threw".

use core::fmt;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::types::CancelReason;

/// A convenient `Result` alias for waiting on cells.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies where a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A continuation raised an error (panicked).
    Computation,
    /// A failure propagated from a dependency.
    Upstream,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computation => write!(f, "computation"),
            Self::Upstream => write!(f, "upstream"),
        }
    }
}

/// A failure recorded in a cell.
///
/// The message always describes the root cause: re-tagging a failure as
/// `Upstream` while it propagates never rewrites the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: FailureKind,
    message: String,
}

impl Failure {
    /// Creates a computation failure with the given root-cause message.
    #[must_use]
    pub fn computation(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Computation,
            message: message.into(),
        }
    }

    /// Creates an upstream failure with the given root-cause message.
    #[must_use]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Upstream,
            message: message.into(),
        }
    }

    /// Re-tags this failure as upstream, preserving the root-cause message.
    #[must_use]
    pub fn into_upstream(self) -> Self {
        Self {
            kind: FailureKind::Upstream,
            message: self.message,
        }
    }

    /// Returns the failure kind.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    /// Returns the root-cause message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Builds a failure from a caught panic payload.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with non-string payload".to_string()
        };
        Self::computation(message)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.kind, self.message)
    }
}

impl std::error::Error for Failure {}

/// The composed error surfaced by [`FutureCell::wait`](crate::FutureCell::wait).
///
/// Identifies the root cause of a non-success terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The cell settled with a failure.
    Failed(Failure),
    /// The cell was cancelled.
    Cancelled(CancelReason),
}

impl Error {
    /// Returns true if this error is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Returns the underlying failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Failed(failure) => Some(failure),
            Self::Cancelled(_) => None,
        }
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub const fn cancel_reason(&self) -> Option<&CancelReason> {
        match self {
            Self::Failed(_) => None,
            Self::Cancelled(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(failure) => write!(f, "future failed: {failure}"),
            Self::Cancelled(reason) => write!(f, "future cancelled: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

/// Runs a continuation, converting a panic into a [`Failure`].
///
/// This is the isolation boundary for user closures: a raised error inside
/// a continuation fails the derived cell instead of unwinding through the
/// settling thread.
pub(crate) fn catch_failure<R>(f: impl FnOnce() -> R) -> std::result::Result<R, Failure> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(Failure::from_panic)
}
