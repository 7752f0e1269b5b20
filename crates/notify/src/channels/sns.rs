//! AWS SNS topic notification channel.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::alert::Alert;
use crate::error::ChannelError;
use crate::NotifyChannel;

/// SNS rejects subjects longer than this.
pub const MAX_SUBJECT_CHARS: usize = 100;

/// SNS API version.
const SNS_API_VERSION: &str = "2010-03-31";

/// Request timeout for a publish call.
const PUBLISH_TIMEOUT_SECS: u64 = 10;

/// SNS `Publish` notification channel.
pub struct SnsChannel {
    /// Region used to derive the endpoint when the topic ARN has none.
    region: String,
    /// Endpoint override (emulators, signing proxies, tests).
    endpoint: Option<String>,
    /// Topic used when the alert has no destination of its own.
    default_topic: Option<String>,
    client: reqwest::Client,
}

impl SnsChannel {
    /// Create an SNS channel for `region`.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PUBLISH_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            region: region.into(),
            endpoint: None,
            default_topic: None,
            client,
        }
    }

    /// Send requests to `endpoint` instead of the regional SNS endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Publish to `topic_arn` when an alert carries no destination.
    #[must_use]
    pub fn with_default_topic(mut self, topic_arn: impl Into<String>) -> Self {
        self.default_topic = Some(topic_arn.into());
        self
    }

    /// Endpoint for a publish to `topic_arn`. SNS requires the call to go to
    /// the topic's own region.
    fn endpoint_for(&self, topic_arn: &str) -> String {
        if let Some(endpoint) = &self.endpoint {
            return endpoint.trim_end_matches('/').to_string();
        }
        let region = region_from_arn(topic_arn).unwrap_or(&self.region);
        format!("https://sns.{region}.amazonaws.com")
    }
}

/// Extract the region from an ARN (`arn:aws:sns:us-east-1:123456789012:topic`).
#[must_use]
pub fn region_from_arn(arn: &str) -> Option<&str> {
    arn.split(':').nth(3).filter(|region| !region.is_empty())
}

/// Truncate a subject to the SNS limit on a character boundary.
#[must_use]
pub fn truncate_subject(subject: &str) -> &str {
    match subject.char_indices().nth(MAX_SUBJECT_CHARS) {
        Some((idx, _)) => &subject[..idx],
        None => subject,
    }
}

#[async_trait]
impl NotifyChannel for SnsChannel {
    fn name(&self) -> &'static str {
        "sns"
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn send(&self, alert: &Alert) -> Result<(), ChannelError> {
        let topic_arn = alert
            .destination
            .as_deref()
            .or(self.default_topic.as_deref())
            .ok_or_else(|| ChannelError::NotConfigured("SNS topic ARN".to_string()))?;

        let url = format!("{}/", self.endpoint_for(topic_arn));
        let subject = truncate_subject(&alert.subject);

        debug!(channel = "sns", topic_arn, subject, "Publishing alert");

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .form(&[
                ("Action", "Publish"),
                ("Version", SNS_API_VERSION),
                ("TopicArn", topic_arn),
                ("Subject", subject),
                ("Message", alert.message.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            let message_id = serde_json::from_str::<PublishResponse>(&body)
                .ok()
                .and_then(|r| r.message_id);
            debug!(
                channel = "sns",
                message_id = message_id.as_deref().unwrap_or("-"),
                "Alert published"
            );
            Ok(())
        } else {
            warn!(
                channel = "sns",
                status = %status,
                body = %body,
                "SNS publish failed"
            );

            Err(ChannelError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Subset of the `Publish` response we log.
#[derive(Debug, Deserialize)]
struct PublishResponse {
    #[serde(rename = "MessageId")]
    message_id: Option<String>,
}
