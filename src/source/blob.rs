//! The blob-store seam and its retrying call-through.
//!
//! Blobs are the slowest resource here to become visible after a deployment
//! (container provisioning, role assignment, upload), so the default budget
//! is much larger than the secret store's.

use std::time::Duration;

use tracing::warn;

use crate::retry::{fetch_with_hooks, RetryExhausted, RetryPolicy};

/// A store of blobs addressed by container and name.
///
/// Contents are raw bytes; the caller decides the encoding.
pub trait BlobSource {
    /// Error produced by the underlying store.
    type Error: std::error::Error;

    /// Download the named blob's contents.
    fn get_blob(&self, container: &str, name: &str) -> Result<Vec<u8>, Self::Error>;
}

/// The retry policy blob downloads have historically needed: thirty attempts
/// three seconds apart.
pub fn default_policy() -> RetryPolicy {
    RetryPolicy::new(30, Duration::from_secs(3))
}

/// Download a blob, retrying per `policy` and warning on each re-attempt.
///
/// # Examples
///
/// ```rust
/// use breakwater::source::fetch_blob;
/// use breakwater::testing::InMemoryBlobs;
/// use breakwater::RetryPolicy;
///
/// let store = InMemoryBlobs::new()
///     .with_blob("democontainer", "greeting.txt", b"hello".to_vec())
///     .unavailable_for(1);
///
/// let contents =
///     fetch_blob(&store, "democontainer", "greeting.txt", RetryPolicy::immediate(5)).unwrap();
/// assert_eq!(contents, b"hello");
/// ```
pub fn fetch_blob<S: BlobSource>(
    source: &S,
    container: &str,
    name: &str,
    policy: RetryPolicy,
) -> Result<Vec<u8>, RetryExhausted<S::Error>> {
    fetch_with_hooks(
        || source.get_blob(container, name),
        policy,
        |event| {
            if event.next_delay.is_some() {
                warn!(
                    container,
                    blob = name,
                    attempt = event.attempt,
                    error = %event.error,
                    "retrying get blob"
                );
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryBlobs, StoreError};

    #[test]
    fn test_fetch_blob_rides_out_transient_failures() {
        let store = InMemoryBlobs::new()
            .with_blob("democontainer", "art.txt", b"ascii art".to_vec())
            .unavailable_for(2);

        let contents =
            fetch_blob(&store, "democontainer", "art.txt", RetryPolicy::immediate(30)).unwrap();

        assert_eq!(contents, b"ascii art");
        assert_eq!(store.lookups(), 3);
    }

    #[test]
    fn test_fetch_blob_exhausts_on_missing_blob() {
        let store = InMemoryBlobs::new();

        let exhausted =
            fetch_blob(&store, "democontainer", "absent.txt", RetryPolicy::immediate(2))
                .unwrap_err();

        assert_eq!(exhausted.attempts, 2);
        assert!(matches!(
            exhausted.final_error,
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn test_default_policy_matches_historical_budget() {
        let policy = default_policy();

        assert_eq!(policy.max_attempts(), 30);
        assert_eq!(policy.delay(), Duration::from_secs(3));
    }
}
