//! Caller-facing result record.

use serde::{Deserialize, Serialize};

use crate::types::{OutcomeKind, RemediationOutcome};

/// Status class of a run result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    ClientError,
    ServerError,
}

impl StatusClass {
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Success => 200,
            Self::ClientError => 400,
            Self::ServerError => 500,
        }
    }
}

impl From<OutcomeKind> for StatusClass {
    fn from(kind: OutcomeKind) -> Self {
        match kind {
            OutcomeKind::Success => Self::Success,
            OutcomeKind::NotRebootable => Self::ClientError,
            OutcomeKind::RebootCommandFailed
            | OutcomeKind::RebootTimedOut
            | OutcomeKind::ApplicationDown
            | OutcomeKind::UnexpectedError => Self::ServerError,
        }
    }
}

/// `{"statusCode": .., "body": ..}` returned to whoever triggered the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub status_code: u16,
    pub body: String,
}

impl RunResult {
    /// Result for a run refused because required settings are absent.
    #[must_use]
    pub fn missing_config() -> Self {
        Self {
            status_code: StatusClass::ClientError.code(),
            body: "Error: Missing environment variables (INSTANCE_ID, SNS_TOPIC_ARN, APP_URL)"
                .to_string(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code == StatusClass::Success.code()
    }
}

impl From<&RemediationOutcome> for RunResult {
    fn from(outcome: &RemediationOutcome) -> Self {
        let body = match outcome.kind {
            OutcomeKind::Success => "EC2 reboot successful and application is running".to_string(),
            OutcomeKind::NotRebootable => "Error: Instance is not in a rebootable state".to_string(),
            OutcomeKind::RebootCommandFailed => "Error: Failed to send reboot command".to_string(),
            OutcomeKind::RebootTimedOut => "Error: Instance did not restart".to_string(),
            OutcomeKind::ApplicationDown => {
                "Error: Application is not running after reboot".to_string()
            }
            OutcomeKind::UnexpectedError => format!("Unexpected Error: {}", outcome.detail),
        };

        Self {
            status_code: StatusClass::from(outcome.kind).code(),
            body,
        }
    }
}
