//! Instance and application health probes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use healer_cloud::{ComputeProvider, InstanceState};
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::traits::{ApplicationProbe, InstanceProbe};
use crate::types::AppHealth;

/// Reads instance state through a [`ComputeProvider`].
///
/// Provider errors are logged and reported as [`InstanceState::ProbeError`].
pub struct ProviderInstanceProbe {
    provider: Arc<dyn ComputeProvider>,
}

impl ProviderInstanceProbe {
    #[must_use]
    pub fn new(provider: Arc<dyn ComputeProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl InstanceProbe for ProviderInstanceProbe {
    async fn instance_state(&self, instance_id: &str) -> InstanceState {
        match self.provider.instance_state(instance_id).await {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    instance_id,
                    provider = self.provider.name(),
                    error = %e,
                    "Error getting instance status"
                );
                InstanceState::ProbeError
            }
        }
    }
}

/// HTTP reachability check: one `GET`, healthy only on exactly 200.
#[derive(Debug, Clone, Default)]
pub struct HttpApplicationProbe {
    client: reqwest::Client,
}

impl HttpApplicationProbe {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApplicationProbe for HttpApplicationProbe {
    async fn check(&self, url: &str, timeout: Duration) -> AppHealth {
        debug!(url, timeout_secs = timeout.as_secs_f64(), "Checking application");

        match self.client.get(url).timeout(timeout).send().await {
            Ok(response) if response.status() == StatusCode::OK => {
                info!(url, status = %response.status(), "Application is running");
                AppHealth::Healthy
            }
            Ok(response) => {
                let status = response.status();
                warn!(url, status = %status, "Application check failed");
                AppHealth::unhealthy(format!("status code {}", status.as_u16()))
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    format!("no response within {}s", timeout.as_secs_f64())
                } else if e.is_connect() {
                    format!("connection failed: {e}")
                } else {
                    e.to_string()
                };
                warn!(url, error = %e, "Error checking application status");
                AppHealth::unhealthy(reason)
            }
        }
    }
}
