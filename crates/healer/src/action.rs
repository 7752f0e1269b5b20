//! Reboot action backed by a compute provider.

use std::sync::Arc;

use async_trait::async_trait;
use healer_cloud::ComputeProvider;
use tracing::{error, info};

use crate::traits::{ActionError, RebootAction};

/// Issues reboots through a [`ComputeProvider`].
pub struct ProviderRebootAction {
    provider: Arc<dyn ComputeProvider>,
}

impl ProviderRebootAction {
    #[must_use]
    pub fn new(provider: Arc<dyn ComputeProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RebootAction for ProviderRebootAction {
    async fn reboot(&self, instance_id: &str) -> Result<(), ActionError> {
        match self.provider.reboot_instance(instance_id).await {
            Ok(()) => {
                info!(instance_id, provider = self.provider.name(), "Reboot command sent");
                Ok(())
            }
            Err(e) => {
                error!(
                    instance_id,
                    provider = self.provider.name(),
                    error = %e,
                    "Error sending reboot command"
                );
                Err(ActionError {
                    instance_id: instance_id.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
