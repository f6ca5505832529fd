//! Exponential reconnect backoff

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Doubling delay between `initial` and `max`
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay to wait now; the following one is twice as long, up to `max`
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current.min(self.max);
        self.current = self.current.saturating_mul(2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    /// Run `op` until it succeeds or `max_attempts` runs out
    ///
    /// `None` retries forever.
    pub async fn retry<T, E, F, Fut>(&mut self, what: &str, max_attempts: Option<u32>, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => {
                    self.reset();
                    return Ok(value);
                }
                Err(e) if max_attempts.is_some_and(|max| attempt >= max) => return Err(e),
                Err(e) => {
                    let delay = self.next_delay();
                    warn!(attempt, delay_ms = delay.as_millis() as u64, "{} failed: {}", what, e);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_delays_double_and_cap() {
        let mut backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(10));
        let delays: Vec<u64> = (0..6).map(|_| backoff.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 10, 10]);

        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_retry_until_success() {
        let calls = Cell::new(0);
        let mut backoff = Backoff::new(Duration::from_millis(1), Duration::from_millis(2));

        let result: Result<&str, String> = tokio_test::block_on(backoff.retry("get_me", None, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(format!("attempt {} failed", n))
                } else {
                    Ok("ok")
                }
            }
        }));

        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_retry_gives_up_after_max_attempts() {
        let calls = Cell::new(0);
        let mut backoff = Backoff::new(Duration::from_millis(1), Duration::from_millis(1));

        let result: Result<(), String> = tokio_test::block_on(backoff.retry("get_me", Some(2), || {
            calls.set(calls.get() + 1);
            async { Err("down".to_string()) }
        }));

        assert_eq!(result, Err("down".to_string()));
        assert_eq!(calls.get(), 2);
    }
}
