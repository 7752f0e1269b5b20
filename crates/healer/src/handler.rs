//! Trigger handling: validate config, serialize per instance, run, report.

use std::sync::Arc;

use anyhow::{Context, Result};
use healer_cloud::{ComputeProvider, Ec2};
use healer_notify::{Notifier, NotifyChannel, SlackChannel, SnsChannel};
use tracing::{info, warn};

use crate::action::ProviderRebootAction;
use crate::alerting::AlertComposer;
use crate::clock::TokioClock;
use crate::config::{HealerConfig, TargetConfig};
use crate::event::AlarmEvent;
use crate::locks::InstanceLocks;
use crate::orchestrator::{Collaborators, Remediator};
use crate::probes::{HttpApplicationProbe, ProviderInstanceProbe};
use crate::result::RunResult;
use crate::types::RemediationRequest;

/// Entry point shared by the CLI and the webhook server.
pub struct Healer {
    target: TargetConfig,
    remediator: Remediator,
    locks: InstanceLocks,
}

impl Healer {
    #[must_use]
    pub fn new(target: TargetConfig, remediator: Remediator) -> Self {
        Self {
            target,
            remediator,
            locks: InstanceLocks::new(),
        }
    }

    /// Wire the production adapters: EC2 for state and reboot, SNS (plus
    /// Slack when configured) for alerts, HTTP for the application check.
    pub fn from_config(config: &HealerConfig) -> Result<Self> {
        let mut ec2 = Ec2::new(config.region.clone()).context("Failed to create EC2 client")?;
        if let Some(endpoint) = &config.endpoint_url {
            ec2 = ec2.with_endpoint(endpoint.clone());
        }
        let provider: Arc<dyn ComputeProvider> = Arc::new(ec2);

        let notifier = if config.notify_disabled {
            warn!("Alert delivery disabled by configuration");
            Notifier::disabled()
        } else {
            let mut sns = SnsChannel::new(config.region.clone());
            if let Some(endpoint) = &config.endpoint_url {
                sns = sns.with_endpoint(endpoint.clone());
            }
            if let Some(topic) = &config.target.topic_arn {
                sns = sns.with_default_topic(topic.clone());
            }

            let mut channels: Vec<Arc<dyn NotifyChannel>> = vec![Arc::new(sns)];
            if let Some(webhook) = &config.slack_webhook_url {
                channels.push(Arc::new(SlackChannel::new(webhook.clone())));
            }
            Notifier::with_channels(channels)
        };

        let client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        let collaborators = Collaborators {
            instances: Arc::new(ProviderInstanceProbe::new(Arc::clone(&provider))),
            action: Arc::new(ProviderRebootAction::new(provider)),
            application: Arc::new(HttpApplicationProbe::new(client)),
            alerts: Arc::new(notifier),
            clock: Arc::new(TokioClock),
        };

        let remediator = Remediator::new(
            collaborators,
            config.timings,
            AlertComposer::new(config.subject_prefix.clone()),
        );

        Ok(Self::new(config.target.clone(), remediator))
    }

    /// Handle one trigger event end to end.
    ///
    /// Missing configuration is reported before any probe runs. Otherwise the
    /// run holds its instance's lock from the first probe until the outcome
    /// is known.
    pub async fn handle(&self, event: &AlarmEvent) -> RunResult {
        info!(alarm_name = event.alarm_name(), "Received alarm");

        let target = match self.target.resolve() {
            Ok(target) => target,
            Err(e) => {
                warn!(error = %e, "Refusing to run");
                return RunResult::missing_config();
            }
        };

        let request = RemediationRequest::new(target, event);
        let _guard = self.locks.acquire(&request.instance_id).await;
        let outcome = self.remediator.run(&request).await;

        RunResult::from(&outcome)
    }

    #[must_use]
    pub fn locks(&self) -> &InstanceLocks {
        &self.locks
    }

    #[must_use]
    pub fn remediator(&self) -> &Remediator {
        &self.remediator
    }
}
