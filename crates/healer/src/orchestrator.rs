//! Remediation state machine.
//!
//! One run walks a fixed sequence of stages and ends in exactly one
//! [`RemediationOutcome`]:
//!
//! ```text
//! PreconditionCheck -> ActionIssued -> RecoveryPoll -> PostRecoveryCheck -> outcome
//! ```
//!
//! Only the recovery poll loops, and only a bounded number of times. Every
//! terminal branch except `NotRebootable` and `Success` raises exactly one
//! alert. A panic anywhere in a run (orchestrator or collaborator) is caught
//! at the run boundary and reported as `UnexpectedError`.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use healer_cloud::InstanceState;
use tracing::{error, info, info_span, warn, Instrument};

use crate::alerting::{AlertComposer, AlertKind};
use crate::config::Timings;
use crate::traits::{AlertSink, ApplicationProbe, Clock, InstanceProbe, RebootAction};
use crate::types::{AppHealth, OutcomeKind, RemediationOutcome, RemediationRequest};

/// The collaborators a [`Remediator`] drives.
#[derive(Clone)]
pub struct Collaborators {
    pub instances: Arc<dyn InstanceProbe>,
    pub action: Arc<dyn RebootAction>,
    pub application: Arc<dyn ApplicationProbe>,
    pub alerts: Arc<dyn AlertSink>,
    pub clock: Arc<dyn Clock>,
}

/// Stage a run is in, for fault reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Stage {
    Start = 0,
    PreconditionCheck = 1,
    ActionIssued = 2,
    RecoveryPoll = 3,
    PostRecoveryCheck = 4,
}

impl Stage {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::PreconditionCheck,
            2 => Self::ActionIssued,
            3 => Self::RecoveryPoll,
            4 => Self::PostRecoveryCheck,
            _ => Self::Start,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::PreconditionCheck => "precondition check",
            Self::ActionIssued => "reboot",
            Self::RecoveryPoll => "recovery poll",
            Self::PostRecoveryCheck => "application check",
        }
    }
}

/// Per-run bookkeeping shared between the stages and the fault handler.
#[derive(Default)]
struct RunTracker {
    stage: AtomicU8,
    alerted: AtomicBool,
}

impl RunTracker {
    fn enter(&self, stage: Stage) {
        self.stage.store(stage as u8, Ordering::SeqCst);
    }

    fn stage(&self) -> Stage {
        Stage::from_u8(self.stage.load(Ordering::SeqCst))
    }
}

/// Result of the recovery poll.
enum Recovery {
    /// Instance reported running on this attempt
    Confirmed { attempt: u32 },
    /// Every attempt passed without a running state
    Exhausted { last_state: InstanceState },
}

/// Runs the remediation state machine.
pub struct Remediator {
    collaborators: Collaborators,
    timings: Timings,
    composer: AlertComposer,
}

impl Remediator {
    #[must_use]
    pub fn new(collaborators: Collaborators, timings: Timings, composer: AlertComposer) -> Self {
        Self {
            collaborators,
            timings,
            composer,
        }
    }

    #[must_use]
    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Run one remediation to completion.
    ///
    /// Never panics and never returns early: the returned outcome is produced
    /// after every probe of the run has finished.
    pub async fn run(&self, request: &RemediationRequest) -> RemediationOutcome {
        let span = info_span!(
            "remediation",
            run_id = %request.run_id,
            instance_id = %request.instance_id,
            alarm_name = %request.alarm_name,
        );

        async {
            info!(metric = %request.metric, "Starting remediation");
            let tracker = RunTracker::default();

            let staged = AssertUnwindSafe(self.run_stages(request, &tracker))
                .catch_unwind()
                .await;

            let outcome = match staged {
                Ok(outcome) => outcome,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    self.handle_fault(request, &tracker, &message).await
                }
            };

            let elapsed_ms = (chrono::Utc::now() - request.received_at).num_milliseconds();
            info!(
                outcome = %outcome.kind,
                detail = %outcome.detail,
                elapsed_ms,
                "Remediation finished"
            );
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_stages(
        &self,
        request: &RemediationRequest,
        tracker: &RunTracker,
    ) -> RemediationOutcome {
        let instance_id = request.instance_id.as_str();

        // Step 1: only reboot an instance that is up or coming up
        tracker.enter(Stage::PreconditionCheck);
        let initial = self.collaborators.instances.instance_state(instance_id).await;
        info!(state = %initial, "Instance state before reboot");

        if !initial.is_rebootable() {
            warn!(state = %initial, "Instance is not in a rebootable state");
            return RemediationOutcome::new(
                OutcomeKind::NotRebootable,
                format!("Instance {instance_id} is {initial}, not in a rebootable state"),
            );
        }

        // Step 2: reboot
        tracker.enter(Stage::ActionIssued);
        if let Err(e) = self.collaborators.action.reboot(instance_id).await {
            let detail = e.to_string();
            self.escalate(request, AlertKind::RebootFailed, &detail, tracker)
                .await;
            return RemediationOutcome::new(OutcomeKind::RebootCommandFailed, detail);
        }

        // Step 3: wait for the instance to come back
        tracker.enter(Stage::RecoveryPoll);
        info!(
            max_attempts = self.timings.poll_attempts,
            interval_secs = self.timings.poll_interval.as_secs_f64(),
            "Waiting for instance to come back online"
        );

        match self.await_recovery(instance_id).await {
            Recovery::Confirmed { attempt } => {
                info!(attempt, "Instance is running again");
            }
            Recovery::Exhausted { last_state } => {
                let detail = format!(
                    "Instance {instance_id} did not report running after {} checks over {}s (last state: {last_state})",
                    self.timings.poll_attempts,
                    self.timings.max_recovery_wait().as_secs(),
                );
                self.escalate(request, AlertKind::RestartFailed, &detail, tracker)
                    .await;
                return RemediationOutcome::new(OutcomeKind::RebootTimedOut, detail);
            }
        }

        // Step 4: let services start, then check the application once
        tracker.enter(Stage::PostRecoveryCheck);
        info!(
            settle_secs = self.timings.settle_delay.as_secs_f64(),
            "Waiting for the application to start"
        );
        self.collaborators.clock.sleep(self.timings.settle_delay).await;

        match self
            .collaborators
            .application
            .check(&request.app_url, self.timings.app_timeout)
            .await
        {
            AppHealth::Healthy => RemediationOutcome::new(
                OutcomeKind::Success,
                format!("Instance {instance_id} rebooted successfully and application is running"),
            ),
            AppHealth::Unhealthy { reason } => {
                let detail = format!(
                    "Instance {instance_id} is running but {} failed its health check: {reason}",
                    request.app_url
                );
                self.escalate(request, AlertKind::ApplicationDown, &detail, tracker)
                    .await;
                RemediationOutcome::new(OutcomeKind::ApplicationDown, detail)
            }
        }
    }

    /// Bounded poll: sleep, then probe, up to `poll_attempts` times. Returns
    /// on the first `Running`; any other state (including probe errors) is
    /// treated as "not yet".
    async fn await_recovery(&self, instance_id: &str) -> Recovery {
        let max_attempts = self.timings.poll_attempts;
        let mut last_state = InstanceState::Unknown;

        for attempt in 1..=max_attempts {
            self.collaborators.clock.sleep(self.timings.poll_interval).await;

            let state = self.collaborators.instances.instance_state(instance_id).await;
            info!(attempt, max_attempts, state = %state, "Current instance state");

            if state == InstanceState::Running {
                return Recovery::Confirmed { attempt };
            }
            last_state = state;
        }

        Recovery::Exhausted { last_state }
    }

    /// Raise the run's alert. A run raises at most one.
    async fn escalate(
        &self,
        request: &RemediationRequest,
        kind: AlertKind,
        detail: &str,
        tracker: &RunTracker,
    ) {
        if tracker.alerted.swap(true, Ordering::SeqCst) {
            warn!(kind = kind.label(), "Alert already raised for this run, suppressing");
            return;
        }

        let alert = self.composer.compose(kind, request, detail);
        error!(subject = %alert.subject, detail, "Escalating");

        let delivery = self.collaborators.alerts.send_alert(&alert).await;
        if !delivery.is_delivered() {
            warn!(
                subject = %alert.subject,
                failed_channels = delivery.failed,
                "Alert was not delivered to any channel"
            );
        }
    }

    async fn handle_fault(
        &self,
        request: &RemediationRequest,
        tracker: &RunTracker,
        message: &str,
    ) -> RemediationOutcome {
        let stage = tracker.stage();
        error!(stage = stage.as_str(), error = %message, "Unexpected error during remediation");

        let detail = format!("{message} (during {})", stage.as_str());
        let escalated = AssertUnwindSafe(self.escalate(
            request,
            AlertKind::UnexpectedError,
            &detail,
            tracker,
        ))
        .catch_unwind()
        .await;

        if escalated.is_err() {
            error!("Alert sink panicked while reporting an unexpected error");
        }

        RemediationOutcome::new(OutcomeKind::UnexpectedError, detail)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown fault".to_string()
    }
}
