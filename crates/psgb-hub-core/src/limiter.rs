use std::sync::Arc;

use tokio::sync::{Semaphore, SemaphorePermit};

/// Process-wide cap on concurrent outgoing HTTP requests, shared across
/// subscription verification, feed fetching, and subscriber distribution.
/// There is no per-host fairness — this is the only thing bounding
/// outgoing concurrency.
#[derive(Debug, Clone)]
pub struct ConnectionLimiter {
    semaphore: Arc<Semaphore>,
}

impl ConnectionLimiter {
    pub fn new(capacity: usize) -> Self {
        ConnectionLimiter {
            semaphore: Arc::new(Semaphore::new(capacity)),
        }
    }

    /// Waits for a free connection slot. The returned permit releases the
    /// slot back to the pool when dropped, including on an early return
    /// from an error path.
    pub async fn acquire(&self) -> SemaphorePermit<'_> {
        self.semaphore
            .acquire()
            .await
            .expect("connection limiter semaphore is never closed")
    }

    /// Connection slots currently free. Exposed for metrics/health checks.
    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_blocks_once_capacity_is_exhausted() {
        let limiter = ConnectionLimiter::new(1);
        let _first = limiter.acquire().await;

        let second = tokio::time::timeout(std::time::Duration::from_millis(20), limiter.acquire()).await;
        assert!(second.is_err(), "second acquire should have blocked");
    }

    #[tokio::test]
    async fn releasing_a_permit_frees_the_slot() {
        let limiter = ConnectionLimiter::new(1);
        {
            let _permit = limiter.acquire().await;
        }
        let permit = tokio::time::timeout(std::time::Duration::from_millis(20), limiter.acquire()).await;
        assert!(permit.is_ok());
    }
}
