//! Futurecell: composable promise cells with explicit execution binding.
//!
//! # Overview
//!
//! Futurecell is an async composition core built on one data structure: the
//! [`FutureCell`], an exactly-once tagged-state cell holding an eventual
//! [`Outcome`] (succeeded, failed, or cancelled). Everything else derives
//! from it: a combinator layer for building dependent cells, an explicit
//! [`Exec`] binding that decides whether continuations run inline or on a
//! worker pool, and cooperative cancellation that propagates as a tagged
//! failure.
//!
//! # Core Guarantees
//!
//! - **Exactly-once settlement**: concurrent `complete`/`fail`/`cancel`
//!   calls race and exactly one wins; losers are silent no-ops
//! - **No missed dependents**: attaching a continuation and settling are
//!   mutually exclusive per cell
//! - **No hidden scheduler**: dispatched continuations require an
//!   explicitly constructed, explicitly owned [`WorkerPool`]
//! - **Cancellation keeps its tag**: downstream observers can always
//!   distinguish "gave up" from "threw"
//! - **Panic isolation**: a continuation panic fails its derived cell
//!   instead of unwinding through the settling thread
//!
//! # Module Structure
//!
//! - [`types`]: Outcome lattice and cancellation payloads
//! - [`cell`]: The promise/future cell
//! - [`combinator`]: map, chain, combine, race, wait_all/any, recover
//! - [`exec`]: Inline vs. dispatched execution binding
//! - [`pool`]: The injected worker pool (submit, spawn, delay)
//! - [`error`]: Failure taxonomy and the composed wait error
//!
//! # Example
//!
//! ```
//! use futurecell::{wait_any, Exec, FutureCell, WorkerPool};
//! use std::time::Duration;
//!
//! let pool = WorkerPool::new(2, 4);
//! let dispatch = Exec::Dispatch(pool.handle());
//!
//! let greeting = pool
//!     .spawn(|| "message".to_string())
//!     .map(&dispatch, |s| s.to_uppercase());
//! assert_eq!(greeting.wait().ok().as_deref(), Some("MESSAGE"));
//!
//! let first = wait_any(&[
//!     pool.delay(Duration::from_millis(50)).map(&dispatch, |()| "slow"),
//!     FutureCell::succeeded("fast"),
//! ]);
//! assert_eq!(first.wait().ok(), Some("fast"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod cell;
pub mod combinator;
pub mod error;
pub mod exec;
pub mod pool;
pub mod types;

// Re-exports for convenient access to core types
pub use cell::FutureCell;
pub use combinator::{wait_all, wait_any};
pub use error::{Error, Failure, FailureKind, Result};
pub use exec::Exec;
pub use pool::{WorkerPool, WorkerPoolHandle, WorkerPoolOptions};
pub use types::{CancelKind, CancelReason, Outcome};
