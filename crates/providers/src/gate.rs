//! Minimum-interval gate for rate-limited providers.
//!
//! Some providers cap request throughput process-wide. The gate serializes
//! callers: each `acquire` waits out the remaining interval and stamps the
//! clock before releasing the lock, so two concurrent callers can never
//! both observe "no wait needed".

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Shared minimum-interval gate. Cheap to clone via `Arc`.
pub struct MinIntervalGate {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl MinIntervalGate {
    /// Create a gate enforcing `interval` between calls. A zero interval
    /// disables waiting but still stamps, keeping the call path uniform.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until the interval since the previous call has elapsed, then
    /// record this call. The wait and the stamp happen under one lock
    /// acquisition.
    pub async fn acquire(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.interval {
                tokio::time::sleep(self.interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_enforces_interval() {
        let gate = MinIntervalGate::new(Duration::from_millis(50));
        let start = Instant::now();
        gate.acquire().await;
        gate.acquire().await;
        gate.acquire().await;
        // Two full intervals between three calls
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_zero_interval_does_not_block() {
        let gate = MinIntervalGate::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..10 {
            gate.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_concurrent_callers_are_serialized() {
        let gate = Arc::new(MinIntervalGate::new(Duration::from_millis(30)));
        let start = Instant::now();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let gate = Arc::clone(&gate);
            handles.push(tokio::spawn(async move {
                gate.acquire().await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Four callers, three intervals: no pair may slip through together.
        assert!(start.elapsed() >= Duration::from_millis(90));
    }
}
