//! Types for one remediation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::RunTarget;
use crate::event::{AlarmEvent, MetricKind};

/// Everything one run needs to know. Immutable for the duration of the run.
#[derive(Debug, Clone, Serialize)]
pub struct RemediationRequest {
    /// Run identifier, carried on every log line of the run
    pub run_id: Uuid,
    /// Target instance
    pub instance_id: String,
    /// Where alerts go (SNS topic ARN)
    pub notify_destination: String,
    /// Application health-check endpoint
    pub app_url: String,
    /// Triggering alarm, for labeling only
    pub alarm_name: String,
    /// Metric class derived from the alarm name
    pub metric: MetricKind,
    /// When the trigger was received
    pub received_at: DateTime<Utc>,
}

impl RemediationRequest {
    /// Build a request from a validated target and the trigger event.
    #[must_use]
    pub fn new(target: RunTarget, event: &AlarmEvent) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            instance_id: target.instance_id,
            notify_destination: target.topic_arn,
            app_url: target.app_url,
            alarm_name: event.alarm_name().to_string(),
            metric: event.metric(),
            received_at: Utc::now(),
        }
    }
}

/// Terminal classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Rebooted, recovered and the application answers
    Success,
    /// Instance was not running or pending; nothing was done
    NotRebootable,
    /// The provider rejected the reboot command
    RebootCommandFailed,
    /// The instance never reported running within the poll window
    RebootTimedOut,
    /// The instance recovered but the application check failed
    ApplicationDown,
    /// A fault escaped every other branch
    UnexpectedError,
}

impl OutcomeKind {
    /// Stable name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotRebootable => "not_rebootable",
            Self::RebootCommandFailed => "reboot_command_failed",
            Self::RebootTimedOut => "reboot_timed_out",
            Self::ApplicationDown => "application_down",
            Self::UnexpectedError => "unexpected_error",
        }
    }
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationOutcome {
    /// Classification
    pub kind: OutcomeKind,
    /// Human-readable detail
    pub detail: String,
}

impl RemediationOutcome {
    /// Create an outcome.
    #[must_use]
    pub fn new(kind: OutcomeKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Whether the run succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }
}

/// Result of one application health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppHealth {
    /// Answered 200 within the timeout
    Healthy,
    /// Anything else; the reason is kept for logs and alerts
    Unhealthy { reason: String },
}

impl AppHealth {
    /// Unhealthy with a reason.
    #[must_use]
    pub fn unhealthy(reason: impl Into<String>) -> Self {
        Self::Unhealthy {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}
