//! # Breakwater
//!
//! > *A breakwater takes the waves so the harbor doesn't have to.*
//!
//! A Rust library for bounded-retry fetching of remote resources.
//!
//! ## Philosophy
//!
//! Freshly deployed workloads race their own infrastructure: the secret is
//! still replicating, the blob container is still provisioning, the role
//! assignment hasn't propagated. The honest fix is not cleverness - it is a
//! bounded number of patient, evenly spaced attempts, and a clear terminal
//! error when the budget runs out. Breakwater packages exactly that:
//!
//! - **Pure core**: [`RetryPolicy`] is just data; every scheduling question
//!   has a pure, testable answer.
//! - **Imperative shell**: [`fetch`] runs the loop; the [`source`] layer adds
//!   the resource seams and the logging.
//!
//! ## Quick Example
//!
//! ```rust
//! use breakwater::{fetch, RetryPolicy};
//! use breakwater::testing::FlakyOperation;
//! use std::time::Duration;
//!
//! // A lookup that fails twice before the value replicates.
//! let lookup = FlakyOperation::new(2, "s3cret", "not yet replicated");
//!
//! let policy = RetryPolicy::new(10, Duration::from_millis(1));
//! let value = fetch(|| lookup.call(), policy).unwrap();
//!
//! assert_eq!(value, "s3cret");
//! assert_eq!(lookup.calls(), 3);
//! ```
//!
//! ## What it refuses to do
//!
//! No jitter, no exponential backoff, no error classification, no implicit
//! timeout: attempts are strictly sequential with a constant delay, any
//! error retries, and deadlines belong to the caller. The crate's surface is
//! small on purpose; everything interesting a fetch touches - credential
//! exchange, drivers, transfer protocols - stays behind the narrow traits in
//! [`source`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod config;
pub mod retry;
pub mod source;
pub mod testing;

// Re-exports
pub use retry::{fetch, fetch_with_hooks, RetryEvent, RetryExhausted, RetryPolicy};

#[cfg(feature = "async")]
pub use retry::{fetch_async, fetch_async_with_hooks};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Cloud, ConfigError, Identity, StorageConfig, VaultConfig};
    pub use crate::retry::{fetch, fetch_with_hooks, RetryEvent, RetryExhausted, RetryPolicy};
    pub use crate::source::{
        ensure_users, fetch_blob, fetch_secret, BlobSource, SecretSource, User, UserStore,
    };

    #[cfg(feature = "async")]
    pub use crate::retry::{fetch_async, fetch_async_with_hooks};
}
