//! Alert composition and delivery for failed runs.

use async_trait::async_trait;
use healer_notify::{Alert, Delivery, Notifier, Severity};

use crate::traits::AlertSink;
use crate::types::RemediationRequest;

/// Which failure an alert reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Reboot command rejected
    RebootFailed,
    /// Instance did not come back within the poll window
    RestartFailed,
    /// Instance is back but the application is not serving
    ApplicationDown,
    /// Fault outside every anticipated branch
    UnexpectedError,
}

impl AlertKind {
    /// Subject label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RebootFailed => "Reboot Failed",
            Self::RestartFailed => "Restart Failed",
            Self::ApplicationDown => "Application Down",
            Self::UnexpectedError => "Unexpected Error",
        }
    }
}

/// Builds subject lines and bodies with a fixed prefix.
#[derive(Debug, Clone)]
pub struct AlertComposer {
    prefix: String,
}

impl AlertComposer {
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Subject line for `kind`.
    ///
    /// Unexpected errors are not tied to a metric and carry an urgency
    /// suffix instead.
    #[must_use]
    pub fn subject(&self, kind: AlertKind, request: &RemediationRequest) -> String {
        match kind {
            AlertKind::UnexpectedError => {
                format!("{} {} - Urgent Attention Needed", self.prefix, kind.label())
            }
            _ => format!("{} {} - {}", self.prefix, kind.label(), request.metric),
        }
    }

    /// Full alert for `kind`, addressed to the request's destination.
    #[must_use]
    pub fn compose(&self, kind: AlertKind, request: &RemediationRequest, detail: &str) -> Alert {
        let id = &request.instance_id;
        let message = match kind {
            AlertKind::RebootFailed => format!(
                "Failed to reboot instance {id}. Immediate manual intervention required.\n\nDetail: {detail}"
            ),
            AlertKind::RestartFailed => format!(
                "Instance {id} failed to reboot. Manual restart required.\n\nDetail: {detail}"
            ),
            AlertKind::ApplicationDown => format!(
                "Instance {id} rebooted but application is NOT running. Immediate action required.\n\nDetail: {detail}"
            ),
            AlertKind::UnexpectedError => format!(
                "Unexpected error while remediating instance {id}: {detail}. Manual intervention required."
            ),
        };

        Alert::new(self.subject(kind, request), message)
            .with_severity(Severity::Critical)
            .with_destination(request.notify_destination.clone())
            .with_context("Instance", id.clone())
            .with_context("Alarm", request.alarm_name.clone())
            .with_context("Run", request.run_id.to_string())
    }
}

#[async_trait]
impl AlertSink for Notifier {
    async fn send_alert(&self, alert: &Alert) -> Delivery {
        self.notify(alert).await
    }
}
