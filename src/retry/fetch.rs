//! The fetch executor: a bounded, fixed-delay retry loop around a
//! caller-supplied operation.
//!
//! The executor is deliberately silent - it performs no logging of its own.
//! Observability belongs to the imperative shell: pass a hook to
//! [`fetch_with_hooks`] or use the resource-layer helpers in
//! [`crate::source`], which emit `tracing` warnings per attempt.

use std::time::{Duration, Instant};

use super::{RetryExhausted, RetryPolicy};

/// Information about a failed attempt, passed to hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before the next attempt, or `None` if the budget is spent.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first attempt started.
    pub elapsed: Duration,
}

/// Invoke `operation` until it succeeds or the policy's attempt budget is
/// spent, sleeping the policy's fixed delay between attempts.
///
/// On success the value is returned immediately - no further attempts, no
/// delay. On failure the last cause is wrapped in [`RetryExhausted`] together
/// with the attempt count. Every error retries; the fetcher makes no
/// transient-versus-permanent distinction, so operations whose failures can
/// never heal should carry a single-attempt policy.
///
/// The operation may have external side effects (network calls) that the
/// fetcher does not deduplicate - callers must ensure it is safe to invoke
/// more than once. Attempts are strictly sequential and block the calling
/// thread; callers needing cancellation or a global deadline wrap the
/// operation with their own.
///
/// # Examples
///
/// ```rust
/// use breakwater::{fetch, RetryPolicy};
/// use breakwater::testing::FlakyOperation;
///
/// let op = FlakyOperation::new(2, "value", "timeout");
/// let result = fetch(|| op.call(), RetryPolicy::immediate(3));
///
/// assert_eq!(result.unwrap(), "value");
/// assert_eq!(op.calls(), 3); // two failures, then success
/// ```
pub fn fetch<T, E, F>(operation: F, policy: RetryPolicy) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Result<T, E>,
{
    fetch_with_hooks(operation, policy, |_| {})
}

/// Like [`fetch`], invoking `on_failure` after every failed attempt.
///
/// The hook fires for the exhausting failure too, with
/// [`RetryEvent::next_delay`] set to `None`. It is synchronous and should not
/// block; use it for logging and metrics.
///
/// # Examples
///
/// ```rust
/// use breakwater::{fetch_with_hooks, RetryPolicy};
///
/// let mut seen = Vec::new();
/// let result = fetch_with_hooks(
///     || Err::<(), _>("unreachable host"),
///     RetryPolicy::immediate(2),
///     |event| seen.push((event.attempt, event.next_delay.is_some())),
/// );
///
/// assert!(result.is_err());
/// assert_eq!(seen, vec![(1, true), (2, false)]);
/// ```
pub fn fetch_with_hooks<T, E, F, H>(
    mut operation: F,
    policy: RetryPolicy,
    mut on_failure: H,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Result<T, E>,
    H: FnMut(&RetryEvent<'_, E>),
{
    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(error) => {
                let delay = policy.delay_after(attempt);

                on_failure(&RetryEvent {
                    attempt: attempt + 1,
                    error: &error,
                    next_delay: delay,
                    elapsed: start.elapsed(),
                });

                match delay {
                    Some(d) => {
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                    None => {
                        return Err(RetryExhausted::new(error, attempt + 1, start.elapsed()));
                    }
                }
            }
        }
    }
}

/// Async variant of [`fetch`]: each attempt awaits a fresh future from the
/// factory, and inter-attempt delays yield to the runtime instead of blocking
/// the thread.
///
/// Attempt and delay semantics are identical to the synchronous executor.
///
/// # Examples
///
/// ```rust
/// use breakwater::{fetch_async, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let result = fetch_async(
///     || async { Ok::<_, String>(42) },
///     RetryPolicy::immediate(3),
/// )
/// .await;
///
/// assert_eq!(result.unwrap(), 42);
/// # });
/// ```
#[cfg(feature = "async")]
pub async fn fetch_async<T, E, F, Fut>(
    operation: F,
    policy: RetryPolicy,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    fetch_async_with_hooks(operation, policy, |_| {}).await
}

/// Async variant of [`fetch_with_hooks`].
///
/// The hook itself stays synchronous - it runs between attempts, before the
/// delay is awaited.
#[cfg(feature = "async")]
pub async fn fetch_async_with_hooks<T, E, F, Fut, H>(
    mut operation: F,
    policy: RetryPolicy,
    mut on_failure: H,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    H: FnMut(&RetryEvent<'_, E>),
{
    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let delay = policy.delay_after(attempt);

                on_failure(&RetryEvent {
                    attempt: attempt + 1,
                    error: &error,
                    next_delay: delay,
                    elapsed: start.elapsed(),
                });

                match delay {
                    Some(d) => {
                        tokio::time::sleep(d).await;
                        attempt += 1;
                    }
                    None => {
                        return Err(RetryExhausted::new(error, attempt + 1, start.elapsed()));
                    }
                }
            }
        }
    }
}
