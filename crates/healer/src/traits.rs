//! Collaborator interfaces consumed by the remediation orchestrator.
//!
//! Each collaborator reports its anticipated failures as a typed value at its
//! own boundary. The orchestrator branches on those values and never sees a
//! raw provider error.

use std::time::Duration;

use async_trait::async_trait;
use healer_cloud::InstanceState;
use healer_notify::{Alert, Delivery};
use thiserror::Error;

use crate::types::AppHealth;

/// The reboot command was not accepted.
#[derive(Debug, Error)]
#[error("reboot of {instance_id} rejected: {reason}")]
pub struct ActionError {
    pub instance_id: String,
    pub reason: String,
}

/// Reads the lifecycle state of an instance.
#[async_trait]
pub trait InstanceProbe: Send + Sync {
    /// Current state. Lookup failures come back as
    /// [`InstanceState::ProbeError`], a missing status record as
    /// [`InstanceState::Unknown`].
    async fn instance_state(&self, instance_id: &str) -> InstanceState;
}

/// Issues the remediation action.
#[async_trait]
pub trait RebootAction: Send + Sync {
    /// Send one reboot command. Does not wait for the restart and never
    /// retries.
    async fn reboot(&self, instance_id: &str) -> Result<(), ActionError>;
}

/// Checks that the hosted application is serving traffic.
#[async_trait]
pub trait ApplicationProbe: Send + Sync {
    /// Single request bounded by `timeout`; no retries.
    async fn check(&self, url: &str, timeout: Duration) -> AppHealth;
}

/// Sends an alert. Best-effort: delivery failures are logged by the sink and
/// only summarised in the returned [`Delivery`].
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send_alert(&self, alert: &Alert) -> Delivery;
}

/// Suspension point for every wait in a run.
///
/// Production code injects [`TokioClock`](crate::clock::TokioClock); tests
/// inject a clock that records the requested delays and returns at once.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
