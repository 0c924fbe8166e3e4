//! Error types for retry operations.

use std::time::Duration;

/// Error returned when all fetch attempts are exhausted.
///
/// Wraps the error from the final attempt along with metadata about the
/// retry sequence. Errors from earlier attempts are discarded: every attempt
/// observed the same policy, and the last cause is the one the caller can
/// still act on.
///
/// # Examples
///
/// ```rust
/// use breakwater::{fetch, RetryPolicy};
///
/// let result = fetch(
///     || Err::<(), _>("always fails"),
///     RetryPolicy::immediate(2),
/// );
///
/// match result {
///     Err(exhausted) => {
///         assert_eq!(exhausted.final_error, "always fails");
///         assert_eq!(exhausted.attempts, 2);
///     }
///     Ok(_) => panic!("Expected failure"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// The error from the final attempt.
    pub final_error: E,
    /// Total number of invocations made, including the first.
    pub attempts: u32,
    /// Total wall time across the whole attempt sequence.
    pub total_duration: Duration,
}

impl<E> RetryExhausted<E> {
    /// Create a new exhaustion error.
    pub fn new(final_error: E, attempts: u32, total_duration: Duration) -> Self {
        Self {
            final_error,
            attempts,
            total_duration,
        }
    }

    /// Get a reference to the final error.
    pub fn error(&self) -> &E {
        &self.final_error
    }

    /// Extract the final error, discarding metadata.
    pub fn into_error(self) -> E {
        self.final_error
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "retry exhausted after {} attempts ({:?}): {}",
            self.attempts, self.total_duration, self.final_error
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryExhausted<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.final_error)
    }
}
