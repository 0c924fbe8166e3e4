//! Testing utilities and helpers for breakwater.
//!
//! This module provides in-memory doubles for every seam in
//! [`crate::source`], a scripted flaky operation for exercising the fetch
//! loop, and an assertion macro for exhaustion results. Everything here is
//! deterministic; "transient" failures are scripted counts, not randomness.
//!
//! # Examples
//!
//! ```rust
//! use breakwater::{fetch, RetryPolicy};
//! use breakwater::testing::FlakyOperation;
//!
//! let op = FlakyOperation::new(2, "value", "timeout");
//!
//! let result = fetch(|| op.call(), RetryPolicy::immediate(5));
//!
//! assert_eq!(result.unwrap(), "value");
//! assert_eq!(op.calls(), 3);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::source::{BlobSource, SecretSource, User, UserStore};

/// An operation that fails a scripted number of times, then succeeds forever,
/// counting every invocation.
///
/// This is the workhorse for retry tests: script the failure count, run a
/// fetch, assert on the invocation count.
///
/// # Examples
///
/// ```rust
/// use breakwater::testing::FlakyOperation;
///
/// let op = FlakyOperation::new(1, 42, "transient");
///
/// assert_eq!(op.call(), Err("transient"));
/// assert_eq!(op.call(), Ok(42));
/// assert_eq!(op.call(), Ok(42));
/// assert_eq!(op.calls(), 3);
/// ```
#[derive(Debug)]
pub struct FlakyOperation<T, E> {
    failures_before_success: u32,
    calls: AtomicU32,
    value: T,
    error: E,
}

impl<T: Clone, E: Clone> FlakyOperation<T, E> {
    /// Create an operation that fails with clones of `error` for the first
    /// `failures_before_success` calls, then returns clones of `value`.
    pub fn new(failures_before_success: u32, value: T, error: E) -> Self {
        Self {
            failures_before_success,
            calls: AtomicU32::new(0),
            value,
            error,
        }
    }

    /// Invoke the operation once.
    pub fn call(&self) -> Result<T, E> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures_before_success {
            Err(self.error.clone())
        } else {
            Ok(self.value.clone())
        }
    }

    /// How many times the operation has been invoked.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Error produced by the in-memory stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The named resource does not exist in the store.
    NotFound {
        /// Name of the missing resource.
        name: String,
    },
    /// The store was scripted to fail this call.
    Unavailable,
    /// The store was scripted to reject inserts with this name.
    Rejected {
        /// Name that was rejected.
        name: String,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound { name } => write!(f, "'{}' was not found", name),
            StoreError::Unavailable => write!(f, "store temporarily unavailable"),
            StoreError::Rejected { name } => write!(f, "insert of '{}' was rejected", name),
        }
    }
}

impl std::error::Error for StoreError {}

/// In-memory [`SecretSource`] with a scripted unavailability window.
///
/// `unavailable_for(n)` makes the first `n` lookups fail with
/// [`StoreError::Unavailable`], modeling a secret that has not replicated
/// yet.
///
/// # Examples
///
/// ```rust
/// use breakwater::source::SecretSource;
/// use breakwater::testing::InMemorySecrets;
///
/// let store = InMemorySecrets::new()
///     .with_secret("db-uri", "mongodb://example")
///     .unavailable_for(1);
///
/// assert!(store.get_secret("db-uri").is_err());
/// assert_eq!(store.get_secret("db-uri").unwrap(), "mongodb://example");
/// ```
#[derive(Debug, Default)]
pub struct InMemorySecrets {
    secrets: HashMap<String, String>,
    unavailable: AtomicU32,
    lookups: AtomicU32,
}

impl InMemorySecrets {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a secret.
    pub fn with_secret(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(name.into(), value.into());
        self
    }

    /// Script the first `failures` lookups to fail.
    pub fn unavailable_for(self, failures: u32) -> Self {
        self.unavailable.store(failures, Ordering::SeqCst);
        self
    }

    /// How many lookups have been made.
    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }

    fn consume_unavailability(&self) -> bool {
        self.unavailable
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl SecretSource for InMemorySecrets {
    type Error = StoreError;

    fn get_secret(&self, name: &str) -> Result<String, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.consume_unavailability() {
            return Err(StoreError::Unavailable);
        }

        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })
    }
}

/// In-memory [`BlobSource`] with a scripted unavailability window.
#[derive(Debug, Default)]
pub struct InMemoryBlobs {
    blobs: HashMap<(String, String), Vec<u8>>,
    unavailable: AtomicU32,
    lookups: AtomicU32,
}

impl InMemoryBlobs {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a blob.
    pub fn with_blob(
        mut self,
        container: impl Into<String>,
        name: impl Into<String>,
        contents: Vec<u8>,
    ) -> Self {
        self.blobs.insert((container.into(), name.into()), contents);
        self
    }

    /// Script the first `failures` downloads to fail.
    pub fn unavailable_for(self, failures: u32) -> Self {
        self.unavailable.store(failures, Ordering::SeqCst);
        self
    }

    /// How many downloads have been attempted.
    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl BlobSource for InMemoryBlobs {
    type Error = StoreError;

    fn get_blob(&self, container: &str, name: &str) -> Result<Vec<u8>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self
            .unavailable
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::Unavailable);
        }

        self.blobs
            .get(&(container.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                name: format!("{}/{}", container, name),
            })
    }
}

/// In-memory [`UserStore`] with a scripted per-name insert rejection.
///
/// # Examples
///
/// ```rust
/// use breakwater::source::{User, UserStore};
/// use breakwater::testing::InMemoryUserStore;
///
/// let store = InMemoryUserStore::new();
/// store
///     .insert_user(&User {
///         name: "Ada".to_string(),
///         email: "ada@example.com".to_string(),
///     })
///     .unwrap();
///
/// assert_eq!(store.users().unwrap().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
    reject_name: Option<String>,
}

impl InMemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script inserts of users with this name to fail.
    pub fn rejecting_name(mut self, name: impl Into<String>) -> Self {
        self.reject_name = Some(name.into());
        self
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl UserStore for InMemoryUserStore {
    type Error = StoreError;

    fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.guard().clone())
    }

    fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        if self.reject_name.as_deref() == Some(user.name.as_str()) {
            return Err(StoreError::Rejected {
                name: user.name.clone(),
            });
        }

        self.guard().push(user.clone());
        Ok(())
    }
}

/// Assert that a fetch result is an exhaustion with the given attempt count.
///
/// # Examples
///
/// ```rust
/// use breakwater::{assert_exhausted, fetch, RetryPolicy};
///
/// let result = fetch(|| Err::<(), _>("down"), RetryPolicy::immediate(2));
/// assert_exhausted!(result, 2);
/// ```
#[macro_export]
macro_rules! assert_exhausted {
    ($result:expr, $attempts:expr) => {
        match $result {
            Err(exhausted) => {
                assert_eq!(
                    exhausted.attempts, $attempts,
                    "expected exhaustion after {} attempts, got {}",
                    $attempts, exhausted.attempts
                );
            }
            Ok(value) => {
                panic!("Expected exhausted retries, got Ok: {:?}", value);
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
impl Arbitrary for crate::RetryPolicy {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        // Delays stay in single-digit milliseconds so property tests that
        // actually sleep remain fast.
        (1u32..=16u32, 0u64..=5u64)
            .prop_map(|(attempts, delay_ms)| {
                crate::RetryPolicy::new(attempts, std::time::Duration::from_millis(delay_ms))
            })
            .boxed()
    }
}
