//! Slack webhook notification channel.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::alert::Alert;
use crate::error::ChannelError;
use crate::NotifyChannel;

/// Slack webhook notification channel.
pub struct SlackChannel {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackChannel {
    /// Create a Slack channel with a specific webhook URL.
    #[must_use]
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            client: reqwest::Client::new(),
        }
    }

    /// Format an alert as a Slack webhook payload.
    fn format_payload(alert: &Alert) -> SlackPayload {
        let fields = alert
            .context
            .iter()
            .map(|(name, value)| SlackField {
                title: name.clone(),
                value: value.clone(),
                short: true,
            })
            .collect();

        let attachment = SlackAttachment {
            fallback: alert.subject.clone(),
            color: alert.severity.color().to_string(),
            author_name: Some("Instance Healer".to_string()),
            title: alert.subject.clone(),
            text: alert.message.clone(),
            fields,
            footer: Some(format!(
                "{} | {}",
                alert.severity.as_str(),
                alert.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
            )),
            ts: Some(alert.timestamp.timestamp()),
        };

        SlackPayload {
            attachments: vec![attachment],
        }
    }
}

#[async_trait]
impl NotifyChannel for SlackChannel {
    fn name(&self) -> &'static str {
        "slack"
    }

    fn enabled(&self) -> bool {
        !self.webhook_url.is_empty()
    }

    async fn send(&self, alert: &Alert) -> Result<(), ChannelError> {
        if self.webhook_url.is_empty() {
            return Err(ChannelError::NotConfigured("SLACK_WEBHOOK_URL".to_string()));
        }

        let payload = Self::format_payload(alert);

        debug!(channel = "slack", subject = %alert.subject, "Sending notification");

        let response = self.client.post(&self.webhook_url).json(&payload).send().await?;

        if response.status().is_success() {
            debug!(channel = "slack", "Notification sent successfully");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            warn!(
                channel = "slack",
                status = %status,
                body = %body,
                "Slack webhook request failed"
            );

            Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

// =============================================================================
// Slack API types
// =============================================================================

#[derive(Debug, Serialize)]
struct SlackPayload {
    attachments: Vec<SlackAttachment>,
}

#[derive(Debug, Serialize)]
struct SlackAttachment {
    fallback: String,
    color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_name: Option<String>,
    title: String,
    text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<SlackField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ts: Option<i64>,
}

#[derive(Debug, Serialize)]
struct SlackField {
    title: String,
    value: String,
    short: bool,
}
