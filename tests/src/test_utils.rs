//! Test utility functions for integration tests
//!
//! Provides common utilities for test setup, logging, and waiting on the
//! node's background threads.

use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, EnvFilter};

/// Result type for integration tests
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Initialize logging for tests with optional filter
///
/// Uses RUST_LOG environment variable if set, otherwise defaults to "info"
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
}

/// Wait for a condition to become true with timeout
///
/// The node runs on OS threads, so the condition is polled every
/// [`DEFAULT_POLL_INTERVAL`] from the calling thread.
pub fn wait_until<F>(mut condition: F, timeout_duration: Duration) -> TestResult
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout_duration;
    loop {
        if condition() {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err("Condition not met within timeout".into());
        }
        thread::sleep(DEFAULT_POLL_INTERVAL);
    }
}

/// Default timeout for test operations
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default poll interval for condition checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_wait_until_sees_other_thread() {
        let counter = Arc::new(AtomicU32::new(0));
        let writer = Arc::clone(&counter);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            writer.store(3, Ordering::SeqCst);
        });

        assert!(wait_until(|| counter.load(Ordering::SeqCst) == 3, Duration::from_secs(1)).is_ok());
        handle.join().unwrap();
    }

    #[test]
    fn test_wait_until_timeout() {
        assert!(wait_until(|| false, Duration::from_millis(30)).is_err());
    }
}
