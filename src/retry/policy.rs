//! Retry policy types and configuration.

use std::time::Duration;

/// A retry policy describing how often to re-attempt a failed fetch.
///
/// Policies are pure data - they describe retry behavior but don't execute it.
/// This makes them easy to test, clone, and inspect. A policy is constructed
/// once per call site and passed to [`fetch`](crate::retry::fetch); nothing
/// about it survives the call.
///
/// # Attempt accounting
///
/// `max_attempts` counts every invocation of the operation, **including the
/// first**. `RetryPolicy::new(3, d)` means: one initial attempt plus at most
/// two retries. A budget of zero is meaningless - the fetch loop always makes
/// its first attempt - so `new` raises it to one.
///
/// # Examples
///
/// ```rust
/// use breakwater::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_secs(1));
///
/// assert_eq!(policy.max_attempts(), 3);
/// assert_eq!(policy.delay(), Duration::from_secs(1));
///
/// // Zero-delay variant for callers that want tight loops
/// let policy = RetryPolicy::immediate(5);
/// assert_eq!(policy.delay(), Duration::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Create a policy allowing `max_attempts` total invocations with a fixed
    /// delay between consecutive attempts.
    ///
    /// A `max_attempts` of zero is raised to one: the first attempt is always
    /// made.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use breakwater::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(0, Duration::ZERO);
    /// assert_eq!(policy.max_attempts(), 1);
    /// ```
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Create a policy with no delay between attempts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use breakwater::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::immediate(3);
    /// assert_eq!(policy.max_attempts(), 3);
    /// assert_eq!(policy.delay(), Duration::ZERO);
    /// ```
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Get the total attempt budget, including the initial attempt.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the fixed inter-attempt delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The delay to wait after 0-indexed attempt `attempt` failed, or `None`
    /// if the attempt budget is spent and the fetch must give up.
    ///
    /// This is the pure function driving the fetch loop: the delay is the
    /// same for every attempt, only the budget runs out.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use breakwater::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::new(3, Duration::from_millis(100));
    ///
    /// assert_eq!(policy.delay_after(0), Some(Duration::from_millis(100)));
    /// assert_eq!(policy.delay_after(1), Some(Duration::from_millis(100)));
    /// assert_eq!(policy.delay_after(2), None); // third attempt was the last
    /// ```
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt.saturating_add(1) >= self.max_attempts {
            None
        } else {
            Some(self.delay)
        }
    }
}

#[cfg(test)]
mod policy_tests {
    use super::*;

    #[test]
    fn test_delay_after_fixed_budget() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));

        assert_eq!(policy.delay_after(0), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(100)));
        assert_eq!(policy.delay_after(2), None);
        assert_eq!(policy.delay_after(3), None);
    }

    #[test]
    fn test_single_attempt_never_waits() {
        let policy = RetryPolicy::new(1, Duration::from_secs(5));

        assert_eq!(policy.delay_after(0), None);
    }

    #[test]
    fn test_zero_attempts_raised_to_one() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10));

        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(policy.delay_after(0), None);
    }

    #[test]
    fn test_immediate_has_zero_delay() {
        let policy = RetryPolicy::immediate(4);

        assert_eq!(policy.delay(), Duration::ZERO);
        assert_eq!(policy.delay_after(0), Some(Duration::ZERO));
        assert_eq!(policy.delay_after(3), None);
    }

    #[test]
    fn test_delay_after_saturates_at_max_index() {
        let policy = RetryPolicy::new(u32::MAX, Duration::ZERO);

        assert_eq!(policy.delay_after(u32::MAX), None);
        assert_eq!(policy.delay_after(u32::MAX - 1), None);
        assert_eq!(policy.delay_after(u32::MAX - 2), Some(Duration::ZERO));
    }

    #[test]
    fn test_policy_is_copy_and_eq() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let copied = policy;
        assert_eq!(policy, copied);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_policy_serde_round_trip() {
        let policy = RetryPolicy::new(3, Duration::from_secs(1));
        let json = serde_json::to_string(&policy).unwrap();
        let back: RetryPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(policy, back);
    }
}
