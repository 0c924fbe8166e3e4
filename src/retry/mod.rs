//! Bounded-retry fetching of remote resources.
//!
//! This module is the crate's core, split the only way it divides cleanly:
//!
//! - **Pure core**: [`RetryPolicy`] is just data - no side effects, easily
//!   testable. [`RetryPolicy::delay_after`] answers every question the loop
//!   asks.
//! - **Imperative shell**: [`fetch`] invokes a caller-supplied operation,
//!   sleeps the policy's fixed delay between failures, and surfaces either
//!   the value or a terminal [`RetryExhausted`].
//!
//! # Quick Start
//!
//! ```rust
//! use breakwater::{fetch, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(3, Duration::from_millis(1));
//!
//! let result = fetch(|| Ok::<_, String>(42), policy);
//!
//! assert_eq!(result.unwrap(), 42);
//! ```
//!
//! # What this loop is, and is not
//!
//! Attempts are strictly sequential with a constant inter-attempt delay -
//! there is no jitter, no exponential backoff, and no error classification:
//! any failure retries until the budget runs out. Callers needing
//! cancellation or a deadline wrap the operation with their own; the fetcher
//! neither provides nor enforces a global timeout.
//!
//! # Error Types
//!
//! - [`RetryExhausted`]: returned when all attempts fail, carrying the final
//!   cause and attempt metadata.

mod error;
mod fetch;
mod policy;

pub use error::RetryExhausted;
pub use fetch::{fetch, fetch_with_hooks, RetryEvent};
pub use policy::RetryPolicy;

#[cfg(feature = "async")]
pub use fetch::{fetch_async, fetch_async_with_hooks};
