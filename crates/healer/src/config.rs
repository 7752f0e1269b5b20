//! Run configuration.
//!
//! Settings come from the process environment, the way the function is
//! deployed. The three target settings are optional at load time and
//! validated at the start of every run, so a missing value turns into a
//! client-error result instead of a startup failure.

use std::time::Duration;

use thiserror::Error;

/// Target instance identifier.
pub const ENV_INSTANCE_ID: &str = "INSTANCE_ID";
/// SNS topic for alerts.
pub const ENV_SNS_TOPIC_ARN: &str = "SNS_TOPIC_ARN";
/// Application URL to check after recovery.
pub const ENV_APP_URL: &str = "APP_URL";

const ENV_AWS_REGION: &str = "AWS_REGION";
const ENV_AWS_ENDPOINT_URL: &str = "AWS_ENDPOINT_URL";
const ENV_SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
const ENV_NOTIFY_DISABLED: &str = "NOTIFY_DISABLED";
const ENV_POLL_ATTEMPTS: &str = "HEALER_POLL_ATTEMPTS";
const ENV_POLL_INTERVAL_SECS: &str = "HEALER_POLL_INTERVAL_SECS";
const ENV_SETTLE_DELAY_SECS: &str = "HEALER_SETTLE_DELAY_SECS";
const ENV_APP_TIMEOUT_SECS: &str = "HEALER_APP_TIMEOUT_SECS";
const ENV_SUBJECT_PREFIX: &str = "HEALER_SUBJECT_PREFIX";

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_SUBJECT_PREFIX: &str = "ITSM EC2";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required settings are absent or empty.
    #[error("Missing environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// A setting is present but unusable.
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Waits and limits for one remediation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Recovery poll attempts (R)
    pub poll_attempts: u32,
    /// Delay before each recovery poll (D)
    pub poll_interval: Duration,
    /// Wait between confirmed recovery and the application check (W)
    pub settle_delay: Duration,
    /// Per-request timeout of the application check
    pub app_timeout: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            poll_attempts: 12,
            poll_interval: Duration::from_secs(5),
            settle_delay: Duration::from_secs(30),
            app_timeout: Duration::from_secs(10),
        }
    }
}

impl Timings {
    /// Longest time the recovery poll can take (R x D).
    #[must_use]
    pub fn max_recovery_wait(&self) -> Duration {
        self.poll_interval * self.poll_attempts
    }
}

/// The three settings every run needs, as loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetConfig {
    pub instance_id: Option<String>,
    pub topic_arn: Option<String>,
    pub app_url: Option<String>,
}

/// Validated run target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTarget {
    pub instance_id: String,
    pub topic_arn: String,
    pub app_url: String,
}

impl TargetConfig {
    /// Validate that every required setting is present.
    ///
    /// The error lists all missing keys, not just the first.
    pub fn resolve(&self) -> Result<RunTarget, ConfigError> {
        let mut missing = Vec::new();
        if self.instance_id.is_none() {
            missing.push(ENV_INSTANCE_ID);
        }
        if self.topic_arn.is_none() {
            missing.push(ENV_SNS_TOPIC_ARN);
        }
        if self.app_url.is_none() {
            missing.push(ENV_APP_URL);
        }

        match (&self.instance_id, &self.topic_arn, &self.app_url) {
            (Some(instance_id), Some(topic_arn), Some(app_url)) => Ok(RunTarget {
                instance_id: instance_id.clone(),
                topic_arn: topic_arn.clone(),
                app_url: app_url.clone(),
            }),
            _ => Err(ConfigError::Missing(missing)),
        }
    }
}

/// Full healer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealerConfig {
    /// Run target (validated per run)
    pub target: TargetConfig,
    /// Poll and settle timings
    pub timings: Timings,
    /// Prefix of every alert subject
    pub subject_prefix: String,
    /// AWS region
    pub region: String,
    /// AWS endpoint override
    pub endpoint_url: Option<String>,
    /// Optional Slack webhook for a second alert channel
    pub slack_webhook_url: Option<String>,
    /// Suppress all alert delivery
    pub notify_disabled: bool,
}

impl Default for HealerConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            timings: Timings::default(),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
            slack_webhook_url: None,
            notify_disabled: false,
        }
    }
}

impl HealerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Timings::default();
        let poll_attempts = match get(ENV_POLL_ATTEMPTS) {
            Some(value) => parse_attempts(&value)?,
            None => defaults.poll_attempts,
        };

        let timings = Timings {
            poll_attempts,
            poll_interval: parse_secs(ENV_POLL_INTERVAL_SECS, get(ENV_POLL_INTERVAL_SECS))?
                .unwrap_or(defaults.poll_interval),
            settle_delay: parse_secs(ENV_SETTLE_DELAY_SECS, get(ENV_SETTLE_DELAY_SECS))?
                .unwrap_or(defaults.settle_delay),
            app_timeout: parse_secs(ENV_APP_TIMEOUT_SECS, get(ENV_APP_TIMEOUT_SECS))?
                .unwrap_or(defaults.app_timeout),
        };

        Ok(Self {
            target: TargetConfig {
                instance_id: get(ENV_INSTANCE_ID),
                topic_arn: get(ENV_SNS_TOPIC_ARN),
                app_url: get(ENV_APP_URL),
            },
            timings,
            subject_prefix: get(ENV_SUBJECT_PREFIX)
                .unwrap_or_else(|| DEFAULT_SUBJECT_PREFIX.to_string()),
            region: get(ENV_AWS_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint_url: get(ENV_AWS_ENDPOINT_URL),
            slack_webhook_url: get(ENV_SLACK_WEBHOOK_URL),
            notify_disabled: get(ENV_NOTIFY_DISABLED)
                .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1"),
        })
    }
}

fn parse_attempts(value: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        key: ENV_POLL_ATTEMPTS,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    match value.parse::<u32>() {
        Ok(0) => Err(invalid("must be at least 1")),
        Ok(attempts) => Ok(attempts),
        Err(e) => Err(invalid(&e.to_string())),
    }
}

fn parse_secs(key: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|value| {
            value
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::Invalid {
                    key,
                    value: value.clone(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}
