//! Three-valued outcome type with severity lattice.
//!
//! The outcome type represents the terminal state of a settled cell:
//!
//! - `Ok(T)`: success with value
//! - `Err(Failure)`: the computation or a dependency failed
//! - `Cancelled(CancelReason)`: the cell was cancelled
//!
//! These form a severity lattice: `Ok < Err < Cancelled`.
//!
//! When aggregating outcomes (e.g. over combined cells), the worst
//! outcome wins.

use super::cancel::CancelReason;
use crate::error::{Error, Failure};

/// The three-valued outcome of a settled cell.
///
/// Forms a severity lattice where worse outcomes dominate:
/// `Ok < Err < Cancelled`
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// Success with a value.
    Ok(T),
    /// The computation failed, or an upstream failure propagated.
    Err(Failure),
    /// The cell was cancelled.
    Cancelled(CancelReason),
}

impl<T> Outcome<T> {
    /// Returns the severity level of this outcome (0 = Ok, 2 = Cancelled).
    #[must_use]
    pub const fn severity(&self) -> u8 {
        match self {
            Self::Ok(_) => 0,
            Self::Err(_) => 1,
            Self::Cancelled(_) => 2,
        }
    }

    /// Returns true if this outcome is `Ok`.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// Returns true if this outcome is `Err`.
    #[must_use]
    pub const fn is_err(&self) -> bool {
        matches!(self, Self::Err(_))
    }

    /// Returns true if this outcome is `Cancelled`.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }

    /// Converts this outcome to a standard `Result`, with cancellation as
    /// an error.
    ///
    /// This is the conversion behind [`FutureCell::wait`](crate::FutureCell::wait).
    pub fn into_result(self) -> Result<T, Error> {
        match self {
            Self::Ok(v) => Ok(v),
            Self::Err(failure) => Err(Error::Failed(failure)),
            Self::Cancelled(reason) => Err(Error::Cancelled(reason)),
        }
    }

    /// Returns the composed error for a non-`Ok` outcome.
    #[must_use]
    pub fn as_error(&self) -> Option<Error> {
        match self {
            Self::Ok(_) => None,
            Self::Err(failure) => Some(Error::Failed(failure.clone())),
            Self::Cancelled(reason) => Some(Error::Cancelled(reason.clone())),
        }
    }

    /// Returns the success value or a default.
    pub fn value_or(self, default: T) -> T {
        match self {
            Self::Ok(v) => v,
            _ => default,
        }
    }
}

impl<T> From<Result<T, Failure>> for Outcome<T> {
    fn from(result: Result<T, Failure>) -> Self {
        match result {
            Ok(v) => Self::Ok(v),
            Err(failure) => Self::Err(failure),
        }
    }
}
