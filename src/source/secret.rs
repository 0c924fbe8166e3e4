//! The secret-store seam and its retrying call-through.
//!
//! Secrets written moments ago may not have replicated to the region a
//! reader runs in, so the first lookups after deployment routinely fail.
//! [`fetch_secret`] wraps any [`SecretSource`] in the crate's retry loop and
//! logs each re-attempt.

use std::time::Duration;

use tracing::warn;

use crate::retry::{fetch_with_hooks, RetryExhausted, RetryPolicy};

/// A store of named secrets.
///
/// This is the external-collaborator seam: implementations talk to a real
/// credential store (or to nothing at all, like
/// [`testing::InMemorySecrets`](crate::testing::InMemorySecrets)); the crate
/// only ever calls through this trait.
///
/// # Examples
///
/// ```rust
/// use breakwater::source::SecretSource;
/// use std::convert::Infallible;
///
/// struct Fixed;
///
/// impl SecretSource for Fixed {
///     type Error = Infallible;
///
///     fn get_secret(&self, _name: &str) -> Result<String, Infallible> {
///         Ok("hunter2".to_string())
///     }
/// }
///
/// assert_eq!(Fixed.get_secret("anything").unwrap(), "hunter2");
/// ```
pub trait SecretSource {
    /// Error produced by the underlying store.
    type Error: std::error::Error;

    /// Retrieve the named secret's current value.
    fn get_secret(&self, name: &str) -> Result<String, Self::Error>;
}

/// The retry policy secret lookups have historically needed: replication
/// settles well within ten attempts a second apart.
pub fn default_policy() -> RetryPolicy {
    RetryPolicy::new(10, Duration::from_secs(1))
}

/// Fetch a secret, retrying per `policy` and warning on each re-attempt.
///
/// Any error retries - a misconfigured vault burns the whole budget before
/// surfacing, which callers accept in exchange for riding out replication
/// delay without special cases.
///
/// # Examples
///
/// ```rust
/// use breakwater::source::fetch_secret;
/// use breakwater::testing::InMemorySecrets;
/// use breakwater::RetryPolicy;
///
/// let store = InMemorySecrets::new()
///     .with_secret("db-uri", "mongodb://example")
///     .unavailable_for(2);
///
/// let value = fetch_secret(&store, "db-uri", RetryPolicy::immediate(5)).unwrap();
/// assert_eq!(value, "mongodb://example");
/// ```
pub fn fetch_secret<S: SecretSource>(
    source: &S,
    name: &str,
    policy: RetryPolicy,
) -> Result<String, RetryExhausted<S::Error>> {
    fetch_with_hooks(
        || source.get_secret(name),
        policy,
        |event| {
            if event.next_delay.is_some() {
                warn!(
                    secret = name,
                    attempt = event.attempt,
                    error = %event.error,
                    "retrying get secret"
                );
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemorySecrets, StoreError};

    #[test]
    fn test_fetch_secret_rides_out_transient_failures() {
        let store = InMemorySecrets::new()
            .with_secret("db-uri", "mongodb://example")
            .unavailable_for(3);

        let value = fetch_secret(&store, "db-uri", RetryPolicy::immediate(10)).unwrap();

        assert_eq!(value, "mongodb://example");
        assert_eq!(store.lookups(), 4);
    }

    #[test]
    fn test_fetch_secret_exhausts_on_missing_secret() {
        let store = InMemorySecrets::new();

        let exhausted = fetch_secret(&store, "absent", RetryPolicy::immediate(3)).unwrap_err();

        assert_eq!(exhausted.attempts, 3);
        assert_eq!(
            exhausted.final_error,
            StoreError::NotFound {
                name: "absent".to_string()
            }
        );
    }

    #[test]
    fn test_default_policy_matches_historical_budget() {
        let policy = default_policy();

        assert_eq!(policy.max_attempts(), 10);
        assert_eq!(policy.delay(), Duration::from_secs(1));
    }
}
