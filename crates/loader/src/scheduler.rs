//! Waiting between attempts.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the attempt sequence for the retry delay.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Real timer backed by `tokio::time`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
