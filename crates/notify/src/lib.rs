//! Best-effort alert delivery for instance remediation.
//!
//! Alerts go out through one or more channels. Delivery is a side effect:
//! every failure is logged here and never handed back as an error, so callers
//! can raise an alert without branching on its result.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use healer_notify::{Alert, Notifier, NotifyChannel, SnsChannel};
//!
//! # async fn run() {
//! let sns: Arc<dyn NotifyChannel> = Arc::new(SnsChannel::new("us-east-1"));
//! let notifier = Notifier::with_channels(vec![sns]);
//!
//! let alert = Alert::new("ITSM EC2 Reboot Failed - CPU Utilization", "Failed to reboot i-123")
//!     .with_destination("arn:aws:sns:us-east-1:123456789012:ops");
//! let delivery = notifier.notify(&alert).await;
//! println!("sent to {} channel(s)", delivery.sent);
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`NotifyChannel`] trait defines the interface for notification channels
//! - [`SnsChannel`] publishes to an AWS SNS topic
//! - [`SlackChannel`] posts to a Slack incoming webhook
//! - [`Notifier`] dispatches an alert to every enabled channel, once each

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod alert;
pub mod channels;
pub mod error;

pub use alert::{Alert, Severity};
pub use channels::slack::SlackChannel;
pub use channels::sns::SnsChannel;
pub use channels::NotifyChannel;
pub use error::ChannelError;

use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Outcome of one [`Notifier::notify`] call, for logging only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Channels that accepted the alert
    pub sent: usize,
    /// Channels that failed
    pub failed: usize,
}

impl Delivery {
    /// Whether at least one channel accepted the alert.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        self.sent > 0
    }
}

/// Central notification dispatcher.
///
/// The `Notifier` holds the enabled channels and sends each alert to all of
/// them. Each channel is attempted exactly once.
pub struct Notifier {
    channels: Vec<Arc<dyn NotifyChannel>>,
    disabled: bool,
}

impl Notifier {
    /// Create a notifier with specific channels.
    #[must_use]
    pub fn with_channels(channels: Vec<Arc<dyn NotifyChannel>>) -> Self {
        if channels.is_empty() {
            warn!("No notification channels configured");
        } else {
            info!(
                channel_count = channels.len(),
                "Notification system initialized"
            );
        }

        Self {
            channels,
            disabled: false,
        }
    }

    /// Create a disabled notifier (for testing or when notifications are off).
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            channels: vec![],
            disabled: true,
        }
    }

    /// Check if any notification channels are enabled.
    #[must_use]
    pub fn has_channels(&self) -> bool {
        !self.disabled && !self.channels.is_empty()
    }

    /// Get the number of enabled channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        if self.disabled {
            0
        } else {
            self.channels.len()
        }
    }

    /// Send an alert to every enabled channel and wait for all of them.
    ///
    /// Errors are logged but not propagated to the caller.
    pub async fn notify(&self, alert: &Alert) -> Delivery {
        let mut delivery = Delivery::default();

        if self.disabled {
            debug!(subject = %alert.subject, "Notifications disabled, skipping alert");
            return delivery;
        }

        for channel in &self.channels {
            let channel_name = channel.name();

            if !channel.enabled() {
                debug!(channel = channel_name, "Channel disabled, skipping");
                continue;
            }

            match channel.send(alert).await {
                Ok(()) => {
                    info!(channel = channel_name, subject = %alert.subject, "Notification sent");
                    delivery.sent += 1;
                }
                Err(e) => {
                    error!(
                        channel = channel_name,
                        subject = %alert.subject,
                        error = %e,
                        "Failed to send notification"
                    );
                    delivery.failed += 1;
                }
            }
        }

        delivery
    }
}
