//! Notification channel implementations.

pub mod slack;
pub mod sns;

use async_trait::async_trait;

use crate::alert::Alert;
use crate::error::ChannelError;

/// Trait for notification channels (SNS, Slack, etc.).
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Check if this channel is enabled/configured.
    fn enabled(&self) -> bool;

    /// Send an alert to this channel.
    async fn send(&self, alert: &Alert) -> Result<(), ChannelError>;
}
