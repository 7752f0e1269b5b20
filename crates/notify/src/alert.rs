//! Alert types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Severity levels for alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational - normal operations
    Info,
    /// Warning - something needs attention
    Warning,
    /// Critical - immediate action required
    Critical,
}

impl Severity {
    /// Get the attachment color for this severity.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Info => "#3498db",     // Blue
            Self::Warning => "#f39c12",  // Orange
            Self::Critical => "#e74c3c", // Red
        }
    }

    /// Get display name for this severity.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// A labeled alert: a subject line plus a message body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Subject line
    pub subject: String,
    /// Message body
    pub message: String,
    /// Severity
    pub severity: Severity,
    /// Channel-specific destination (an SNS topic ARN). Channels fall back
    /// to their own default when unset.
    #[serde(default)]
    pub destination: Option<String>,
    /// Extra key/value context rendered by rich channels
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// When the alert was raised
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Create a critical alert.
    #[must_use]
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
            severity: Severity::Critical,
            destination: None,
            context: BTreeMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Set the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the destination.
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Add a context field.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}
