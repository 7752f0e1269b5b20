//! Inbound alarm trigger payload.

use serde::{Deserialize, Serialize};

/// Alarm name used when the trigger does not carry one.
pub const UNKNOWN_ALARM: &str = "Unknown";

/// One trigger event. Only the alarm name is read; every other field is
/// ignored, and `{}` is a valid event.
///
/// Two shapes are accepted:
/// - `{"alarmName": "..."}` (direct invocation, API gateway, manual trigger)
/// - `{"alarmData": {"alarmName": "..."}}` (CloudWatch alarm action)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmEvent {
    /// Top-level alarm name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_name: Option<String>,
    /// CloudWatch alarm-action envelope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_data: Option<AlarmData>,
}

/// The `alarmData` block of a CloudWatch alarm action.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmData {
    /// Alarm name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm_name: Option<String>,
}

impl AlarmEvent {
    /// Event for a named alarm.
    #[must_use]
    pub fn named(alarm_name: impl Into<String>) -> Self {
        Self {
            alarm_name: Some(alarm_name.into()),
            alarm_data: None,
        }
    }

    /// The alarm name, or [`UNKNOWN_ALARM`].
    #[must_use]
    pub fn alarm_name(&self) -> &str {
        self.alarm_name
            .as_deref()
            .or_else(|| {
                self.alarm_data
                    .as_ref()
                    .and_then(|data| data.alarm_name.as_deref())
            })
            .unwrap_or(UNKNOWN_ALARM)
    }

    /// Metric class used to label outgoing alerts.
    #[must_use]
    pub fn metric(&self) -> MetricKind {
        MetricKind::from_alarm_name(self.alarm_name())
    }
}

/// Which utilization metric tripped the alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// CPU utilization alarm
    Cpu,
    /// Anything else is reported as memory pressure
    Memory,
}

impl MetricKind {
    /// Classify by alarm name: names containing `CPU` are CPU alarms.
    #[must_use]
    pub fn from_alarm_name(name: &str) -> Self {
        if name.contains("CPU") {
            Self::Cpu
        } else {
            Self::Memory
        }
    }

    /// Label used in alert subjects.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cpu => "CPU Utilization",
            Self::Memory => "Memory Utilization",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
