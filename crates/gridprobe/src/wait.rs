//! Wait Mechanisms
//!
//! Bounded, polling waits against a [`GridDriver`].
//!
//! Every wait is a suspension point built on `tokio::time::sleep`. A wait
//! never returns a driver error: a failed probe counts as "not yet" and the
//! outcome is reported as a [`WaitResult`] or [`Stability`] value so callers
//! decide whether a timeout is fatal. Dropping the future abandons the wait
//! without touching the page.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

use crate::driver::GridDriver;
use crate::locator::Selector;
use crate::result::ProbeResult;

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS)
    }
}

impl WaitOptions {
    /// Create wait options
    #[must_use]
    pub const fn new(timeout_ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            timeout_ms,
            poll_interval_ms,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration (never zero)
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a wait operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Whether the condition was met before the timeout
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

impl WaitResult {
    /// Create a successful wait result
    #[must_use]
    pub fn success(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: true,
            elapsed,
            waited_for: waited_for.into(),
        }
    }

    /// Create a timeout wait result
    #[must_use]
    pub fn timeout(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed,
            waited_for: waited_for.into(),
        }
    }
}

/// Outcome of waiting for a loading indicator to come and go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
    /// Indicator appeared and then disappeared
    Settled,
    /// Indicator never showed up within the appear window
    NeverAppeared,
    /// Indicator was still visible when the stability timeout ran out
    Unstable,
}

impl Stability {
    /// Whether subsequent reads should observe a settled page
    #[must_use]
    pub const fn is_stable(self) -> bool {
        !matches!(self, Self::Unstable)
    }
}

// =============================================================================
// WAITS
// =============================================================================

/// Poll `probe` until it yields a value or the timeout elapses.
///
/// Errors from `probe` are logged at debug level and treated as "not yet".
pub async fn wait_for_value<T, F, Fut>(options: &WaitOptions, mut probe: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<Option<T>>>,
{
    let start = Instant::now();
    loop {
        match probe().await {
            Ok(Some(value)) => return Some(value),
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "probe failed while waiting"),
        }
        if start.elapsed() >= options.timeout() {
            return None;
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

/// Poll a boolean condition until it holds or the timeout elapses
pub async fn wait_until<F, Fut>(
    options: &WaitOptions,
    waited_for: impl Into<String>,
    mut condition: F,
) -> WaitResult
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<bool>>,
{
    let start = Instant::now();
    let met = wait_for_value(options, || {
        let fut = condition();
        async move { fut.await.map(|ok| ok.then_some(())) }
    })
    .await
    .is_some();

    if met {
        WaitResult::success(start.elapsed(), waited_for)
    } else {
        WaitResult::timeout(start.elapsed(), waited_for)
    }
}

/// Wait for the first match of `selector` to be visible
pub async fn wait_visible<D>(driver: &D, selector: &Selector, options: &WaitOptions) -> WaitResult
where
    D: GridDriver + ?Sized,
{
    let result = wait_until(options, format!("visible: {selector}"), || {
        driver.is_visible(selector)
    })
    .await;
    tracing::debug!(%selector, success = result.success, elapsed_ms = result.elapsed.as_millis() as u64, "wait visible");
    result
}

/// Wait for `selector` to be hidden or detached
pub async fn wait_hidden<D>(driver: &D, selector: &Selector, options: &WaitOptions) -> WaitResult
where
    D: GridDriver + ?Sized,
{
    let result = wait_until(options, format!("hidden: {selector}"), || async move {
        driver.is_visible(selector).await.map(|visible| !visible)
    })
    .await;
    tracing::debug!(%selector, success = result.success, elapsed_ms = result.elapsed.as_millis() as u64, "wait hidden");
    result
}

/// Wait for a loading indicator to appear and then disappear.
///
/// An indicator that never appears within `appear` counts as a fast load.
/// One that is still visible after `disappear` is reported as
/// [`Stability::Unstable`]; callers log it and carry on.
pub async fn wait_for_stable<D>(
    driver: &D,
    loading: &Selector,
    appear: &WaitOptions,
    disappear: &WaitOptions,
) -> Stability
where
    D: GridDriver + ?Sized,
{
    if !wait_visible(driver, loading, appear).await.success {
        return Stability::NeverAppeared;
    }
    if wait_hidden(driver, loading, disappear).await.success {
        Stability::Settled
    } else {
        Stability::Unstable
    }
}

/// Fixed settle delay after an interaction
pub async fn settle(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast(timeout_ms: u64) -> WaitOptions {
        WaitOptions::new(timeout_ms, 2)
    }

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_builders() {
            let opts = WaitOptions::default()
                .with_timeout(1_500)
                .with_poll_interval(25);
            assert_eq!(opts.timeout(), Duration::from_millis(1_500));
            assert_eq!(opts.poll_interval(), Duration::from_millis(25));
        }

        #[test]
        fn test_zero_poll_interval_clamped() {
            assert_eq!(
                WaitOptions::new(10, 0).poll_interval(),
                Duration::from_millis(1)
            );
        }
    }

    mod polling_tests {
        use super::*;

        #[tokio::test]
        async fn test_wait_for_value_returns_first_hit() {
            let calls = AtomicUsize::new(0);
            let value = wait_for_value(&fast(500), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok((n >= 2).then_some(n)) }
            })
            .await;
            assert_eq!(value, Some(2));
        }

        #[tokio::test]
        async fn test_wait_for_value_swallows_errors() {
            let calls = AtomicUsize::new(0);
            let value = wait_for_value(&fast(500), || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(crate::result::ProbeError::driver("detached"))
                    } else {
                        Ok(Some("ready"))
                    }
                }
            })
            .await;
            assert_eq!(value, Some("ready"));
        }

        #[tokio::test]
        async fn test_wait_for_value_times_out() {
            let value: Option<()> = wait_for_value(&fast(10), || async { Ok(None) }).await;
            assert!(value.is_none());
        }

        #[tokio::test]
        async fn test_wait_until_reports_description() {
            let result = wait_until(&fast(10), "never", || async { Ok(false) }).await;
            assert!(!result.success);
            assert_eq!(result.waited_for, "never");
            assert!(result.elapsed >= Duration::from_millis(10));
        }
    }

    mod visibility_tests {
        use super::*;

        #[tokio::test]
        async fn test_wait_visible_for_rendered_element() {
            let driver = MockDriver::new();
            let header = Selector::css("thead th");
            driver.set_texts(&header, ["Name"]);
            let result = wait_visible(&driver, &header, &fast(50)).await;
            assert!(result.success);
        }

        #[tokio::test]
        async fn test_wait_visible_missing_element_times_out() {
            let driver = MockDriver::new();
            let result = wait_visible(&driver, &Selector::css(".nope"), &fast(10)).await;
            assert!(!result.success);
            assert!(result.waited_for.contains(".nope"));
        }

        #[tokio::test]
        async fn test_wait_hidden_for_missing_element() {
            let driver = MockDriver::new();
            let result = wait_hidden(&driver, &Selector::css(".spinner"), &fast(10)).await;
            assert!(result.success);
        }
    }

    mod stability_tests {
        use super::*;

        #[tokio::test]
        async fn test_spinner_that_comes_and_goes_settles() {
            let driver = MockDriver::new();
            let spinner = Selector::css(".spinner");
            driver.script_visibility(&spinner, [true, true, false]);
            let outcome = wait_for_stable(&driver, &spinner, &fast(50), &fast(200)).await;
            assert_eq!(outcome, Stability::Settled);
            assert!(outcome.is_stable());
        }

        #[tokio::test]
        async fn test_spinner_that_never_appears() {
            let driver = MockDriver::new();
            let spinner = Selector::css(".spinner");
            let outcome = wait_for_stable(&driver, &spinner, &fast(10), &fast(10)).await;
            assert_eq!(outcome, Stability::NeverAppeared);
            assert!(outcome.is_stable());
        }

        #[tokio::test]
        async fn test_spinner_that_never_leaves_is_unstable() {
            let driver = MockDriver::new();
            let spinner = Selector::css(".spinner");
            driver.script_visibility(&spinner, [true]);
            let outcome = wait_for_stable(&driver, &spinner, &fast(20), &fast(20)).await;
            assert_eq!(outcome, Stability::Unstable);
            assert!(!outcome.is_stable());
        }
    }
}
