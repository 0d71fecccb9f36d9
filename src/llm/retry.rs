use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Bounded retries with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Runs `op` until it succeeds, returns an error `should_retry` rejects, or
    /// the retry budget is spent. The last error is returned as-is.
    pub async fn run<T, E, F, Fut>(
        &self,
        operation: &str,
        should_retry: impl Fn(&E) -> bool,
        mut op: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut retries = 0;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) if retries < self.max_retries && should_retry(&e) => {
                    retries += 1;
                    warn!(
                        operation,
                        error = %e,
                        attempt = retries + 1,
                        max_attempts = self.max_retries + 1,
                        "retrying after failure"
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
