//! Timer used for the recovery poll and settle waits.

use std::time::Duration;

use async_trait::async_trait;

use crate::traits::Clock;

/// Clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
