//! Compute provider trait and common types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during compute provider operations.
#[derive(Error, Debug)]
pub enum CloudProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] quick_xml::DeError),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),
}

/// Lifecycle state of a compute instance.
///
/// Providers only ever report the first seven variants. `ProbeError` is
/// produced by callers that convert a failed lookup into a state, so that a
/// transport error during a reboot window reads as "not yet running" instead
/// of aborting the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceState {
    /// Instance is starting.
    Pending,
    /// Instance is running.
    Running,
    /// Instance is being terminated.
    ShuttingDown,
    /// Instance is terminated.
    Terminated,
    /// Instance is stopping.
    Stopping,
    /// Instance is stopped.
    Stopped,
    /// The state lookup itself failed.
    ProbeError,
    /// No status record, or a state name we do not recognise.
    #[serde(other)]
    Unknown,
}

impl InstanceState {
    /// Parse a provider state name (`running`, `shutting-down`, ...).
    #[must_use]
    pub fn from_provider_name(name: &str) -> Self {
        match name {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "shutting-down" => Self::ShuttingDown,
            "terminated" => Self::Terminated,
            "stopping" => Self::Stopping,
            "stopped" => Self::Stopped,
            _ => Self::Unknown,
        }
    }

    /// Whether a reboot may be issued from this state.
    #[must_use]
    pub const fn is_rebootable(self) -> bool {
        matches!(self, Self::Running | Self::Pending)
    }

    /// Provider-style name for this state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
            Self::ProbeError => "error",
        }
    }
}

impl std::fmt::Display for InstanceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for compute providers.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Provider name, used in logs.
    fn name(&self) -> &'static str;

    /// Get the lifecycle state of an instance.
    ///
    /// Returns `Ok(InstanceState::Unknown)` when the provider has no status
    /// record for `id`.
    async fn instance_state(&self, id: &str) -> Result<InstanceState, CloudProviderError>;

    /// Request a reboot. Returns once the provider accepted the request; it
    /// does not wait for the instance to restart.
    async fn reboot_instance(&self, id: &str) -> Result<(), CloudProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names_round_trip_through_display() {
        for name in [
            "pending",
            "running",
            "shutting-down",
            "terminated",
            "stopping",
            "stopped",
        ] {
            assert_eq!(InstanceState::from_provider_name(name).to_string(), name);
        }
        assert_eq!(
            InstanceState::from_provider_name("rebooting"),
            InstanceState::Unknown
        );
    }

    #[test]
    fn test_only_running_and_pending_are_rebootable() {
        assert!(InstanceState::Running.is_rebootable());
        assert!(InstanceState::Pending.is_rebootable());
        for state in [
            InstanceState::ShuttingDown,
            InstanceState::Terminated,
            InstanceState::Stopping,
            InstanceState::Stopped,
            InstanceState::Unknown,
            InstanceState::ProbeError,
        ] {
            assert!(!state.is_rebootable(), "{state} should not be rebootable");
        }
    }

    #[test]
    fn test_unrecognised_serde_name_is_unknown() {
        let state: InstanceState = serde_json::from_str("\"hibernating\"").unwrap();
        assert_eq!(state, InstanceState::Unknown);

        let state: InstanceState = serde_json::from_str("\"probe-error\"").unwrap();
        assert_eq!(state, InstanceState::ProbeError);
    }
}
