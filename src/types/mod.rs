//! Core types: outcomes and cancellation payloads.

pub mod cancel;
pub mod outcome;

pub use cancel::{CancelKind, CancelReason};
pub use outcome::Outcome;
