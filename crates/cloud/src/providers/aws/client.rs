//! AWS EC2 API client implementation.
//!
//! Requests use the EC2 query API, which answers in XML. Request signing is
//! delegated to whatever sits behind the configured endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};

use super::models::{
    DescribeInstanceStatusResponse, ErrorResponse, RebootInstancesResponse, EC2_API_VERSION,
};
use crate::providers::traits::{CloudProviderError, ComputeProvider, InstanceState};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// AWS EC2 provider.
#[derive(Clone)]
pub struct Ec2 {
    /// HTTP client.
    client: Client,
    /// AWS region.
    region: String,
    /// Endpoint override (emulators, signing proxies, tests).
    endpoint: Option<String>,
}

impl Ec2 {
    /// Create a new EC2 provider.
    ///
    /// # Arguments
    /// * `region` - AWS region (e.g., "us-east-1")
    ///
    /// # Errors
    /// Returns error if the region is empty or the HTTP client cannot be created.
    pub fn new(region: impl Into<String>) -> Result<Self, CloudProviderError> {
        let region = region.into();
        if region.trim().is_empty() {
            return Err(CloudProviderError::Config("AWS region is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(CloudProviderError::Http)?;

        Ok(Self {
            client,
            region,
            endpoint: None,
        })
    }

    /// Send requests to `endpoint` instead of the regional EC2 endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Configured region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Get EC2 API endpoint.
    fn ec2_endpoint(&self) -> String {
        self.endpoint.as_ref().map_or_else(
            || format!("https://ec2.{}.amazonaws.com", self.region),
            |endpoint| endpoint.trim_end_matches('/').to_string(),
        )
    }

    /// Execute an EC2 query-API action against a single instance.
    async fn ec2_request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        action: &str,
        instance_id: &str,
    ) -> Result<T, CloudProviderError> {
        let url = format!("{}/", self.ec2_endpoint());
        debug!(url = %url, method = %method, action, instance_id, "EC2 request");

        let response = self
            .client
            .request(method, &url)
            .query(&[
                ("Action", action),
                ("Version", EC2_API_VERSION),
                ("InstanceId.1", instance_id),
            ])
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// Handle API response.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CloudProviderError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return quick_xml::de::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                CloudProviderError::Serialization(e)
            });
        }

        let message = ErrorResponse::parse(&text).unwrap_or(text);
        if status == StatusCode::NOT_FOUND {
            Err(CloudProviderError::NotFound(message))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(CloudProviderError::Auth(message))
        } else {
            Err(CloudProviderError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ComputeProvider for Ec2 {
    fn name(&self) -> &'static str {
        "ec2"
    }

    async fn instance_state(&self, id: &str) -> Result<InstanceState, CloudProviderError> {
        let response: DescribeInstanceStatusResponse = self
            .ec2_request(reqwest::Method::GET, "DescribeInstanceStatus", id)
            .await?;

        // EC2 omits instances that are not running unless asked otherwise,
        // so an empty list is a valid answer rather than an error.
        let state = response
            .instance_status_set
            .items
            .first()
            .map_or(InstanceState::Unknown, |status| {
                InstanceState::from_provider_name(&status.instance_state.name)
            });

        debug!(instance_id = %id, state = %state, "Instance status");
        Ok(state)
    }

    async fn reboot_instance(&self, id: &str) -> Result<(), CloudProviderError> {
        info!(instance_id = %id, "Rebooting instance");

        let response: RebootInstancesResponse = self
            .ec2_request(reqwest::Method::POST, "RebootInstances", id)
            .await?;

        if response.accepted == Some(false) {
            return Err(CloudProviderError::Api {
                status: 200,
                message: format!("RebootInstances returned false for {id}"),
            });
        }

        info!(
            instance_id = %id,
            request_id = response.request_id.as_deref().unwrap_or("-"),
            "Reboot initiated"
        );
        Ok(())
    }
}
