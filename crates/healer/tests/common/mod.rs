//! Recording doubles for the remediation collaborators.
//!
//! Every double writes to a shared [`Journal`] so tests can assert on the
//! exact order of probes, sleeps and alerts.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use healer::{
    ActionError, AlarmEvent, AlertComposer, AlertSink, AppHealth, ApplicationProbe, Clock,
    Collaborators, InstanceProbe, RebootAction, RemediationRequest, Remediator, RunTarget,
    TargetConfig, Timings,
};
use healer_cloud::InstanceState;
use healer_notify::{Alert, Delivery};

pub const INSTANCE_ID: &str = "i-0abc123def4567890";
pub const TOPIC_ARN: &str = "arn:aws:sns:us-east-1:123456789012:ops-alerts";
pub const APP_URL: &str = "http://10.0.0.5/health";

// =============================================================================
// Journal
// =============================================================================

/// Ordered record of every collaborator call.
#[derive(Default)]
pub struct Journal(Mutex<Vec<String>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

// =============================================================================
// Doubles
// =============================================================================

/// Returns scripted states in order, repeating the last one once exhausted.
pub struct ScriptedInstances {
    journal: Arc<Journal>,
    states: Mutex<VecDeque<InstanceState>>,
    last: Mutex<InstanceState>,
    pub calls: AtomicUsize,
}

impl ScriptedInstances {
    pub fn new(journal: Arc<Journal>, states: Vec<InstanceState>) -> Self {
        Self {
            journal,
            states: Mutex::new(states.into()),
            last: Mutex::new(InstanceState::Unknown),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InstanceProbe for ScriptedInstances {
    async fn instance_state(&self, _instance_id: &str) -> InstanceState {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.journal.push("probe");

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.states.lock().unwrap().pop_front() {
            *last = next;
        }
        *last
    }
}

pub struct CountingReboot {
    journal: Arc<Journal>,
    failure: Option<String>,
    pub calls: AtomicUsize,
}

impl CountingReboot {
    pub fn new(journal: Arc<Journal>, failure: Option<String>) -> Self {
        Self {
            journal,
            failure,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RebootAction for CountingReboot {
    async fn reboot(&self, instance_id: &str) -> Result<(), ActionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.journal.push("reboot");

        match &self.failure {
            Some(reason) => Err(ActionError {
                instance_id: instance_id.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

pub struct FixedApp {
    journal: Arc<Journal>,
    health: AppHealth,
    pub calls: AtomicUsize,
    pub checks: Mutex<Vec<(String, Duration)>>,
}

impl FixedApp {
    pub fn new(journal: Arc<Journal>, health: AppHealth) -> Self {
        Self {
            journal,
            health,
            calls: AtomicUsize::new(0),
            checks: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ApplicationProbe for FixedApp {
    async fn check(&self, url: &str, timeout: Duration) -> AppHealth {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.journal.push("app");
        self.checks.lock().unwrap().push((url.to_string(), timeout));
        self.health.clone()
    }
}

/// Records alerts; optionally panics after recording.
pub struct RecordingSink {
    journal: Arc<Journal>,
    panic_on_send: bool,
    pub alerts: Mutex<Vec<Alert>>,
}

impl RecordingSink {
    pub fn new(journal: Arc<Journal>, panic_on_send: bool) -> Self {
        Self {
            journal,
            panic_on_send,
            alerts: Mutex::new(Vec::new()),
        }
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.alerts().into_iter().map(|a| a.subject).collect()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn send_alert(&self, alert: &Alert) -> Delivery {
        self.journal.push("alert");
        self.alerts.lock().unwrap().push(alert.clone());
        assert!(!self.panic_on_send, "alert sink exploded");
        Delivery { sent: 1, failed: 0 }
    }
}

/// Records requested delays; waits `delay` of real time per sleep (zero by default).
pub struct RecordingClock {
    journal: Arc<Journal>,
    delay: Duration,
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingClock {
    pub fn new(journal: Arc<Journal>) -> Self {
        Self::with_delay(journal, Duration::ZERO)
    }

    pub fn with_delay(journal: Arc<Journal>, delay: Duration) -> Self {
        Self {
            journal,
            delay,
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.journal.push(format!("sleep {}", duration.as_secs()));
        self.sleeps.lock().unwrap().push(duration);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

/// Panics on every call, whatever role it plays.
pub struct Exploding(pub &'static str);

#[async_trait]
impl InstanceProbe for Exploding {
    async fn instance_state(&self, _instance_id: &str) -> InstanceState {
        panic!("{}", self.0)
    }
}

#[async_trait]
impl ApplicationProbe for Exploding {
    async fn check(&self, _url: &str, _timeout: Duration) -> AppHealth {
        panic!("{}", self.0)
    }
}

#[async_trait]
impl RebootAction for Exploding {
    async fn reboot(&self, _instance_id: &str) -> Result<(), ActionError> {
        panic!("{}", self.0)
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A full set of doubles sharing one journal.
pub struct Harness {
    pub journal: Arc<Journal>,
    pub instances: Arc<ScriptedInstances>,
    pub action: Arc<CountingReboot>,
    pub application: Arc<FixedApp>,
    pub alerts: Arc<RecordingSink>,
    pub clock: Arc<RecordingClock>,
    pub timings: Timings,
}

impl Harness {
    /// Reboot accepted, application healthy, reference timings.
    pub fn new(states: Vec<InstanceState>) -> Self {
        let journal = Arc::new(Journal::default());
        Self {
            instances: Arc::new(ScriptedInstances::new(Arc::clone(&journal), states)),
            action: Arc::new(CountingReboot::new(Arc::clone(&journal), None)),
            application: Arc::new(FixedApp::new(Arc::clone(&journal), AppHealth::Healthy)),
            alerts: Arc::new(RecordingSink::new(Arc::clone(&journal), false)),
            clock: Arc::new(RecordingClock::new(Arc::clone(&journal))),
            timings: Timings::default(),
            journal,
        }
    }

    pub fn with_reboot_failure(mut self, reason: &str) -> Self {
        self.action = Arc::new(CountingReboot::new(
            Arc::clone(&self.journal),
            Some(reason.to_string()),
        ));
        self
    }

    pub fn with_app_health(mut self, health: AppHealth) -> Self {
        self.application = Arc::new(FixedApp::new(Arc::clone(&self.journal), health));
        self
    }

    pub fn with_panicking_sink(mut self) -> Self {
        self.alerts = Arc::new(RecordingSink::new(Arc::clone(&self.journal), true));
        self
    }

    /// Every clock sleep takes `delay` of real time.
    pub fn with_clock_delay(mut self, delay: Duration) -> Self {
        self.clock = Arc::new(RecordingClock::with_delay(Arc::clone(&self.journal), delay));
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            instances: self.instances.clone(),
            action: self.action.clone(),
            application: self.application.clone(),
            alerts: self.alerts.clone(),
            clock: self.clock.clone(),
        }
    }

    pub fn remediator(&self) -> Remediator {
        remediator_with(self.collaborators(), self.timings)
    }
}

pub fn remediator_with(collaborators: Collaborators, timings: Timings) -> Remediator {
    Remediator::new(collaborators, timings, AlertComposer::new("ITSM EC2"))
}

pub fn target() -> RunTarget {
    RunTarget {
        instance_id: INSTANCE_ID.to_string(),
        topic_arn: TOPIC_ARN.to_string(),
        app_url: APP_URL.to_string(),
    }
}

pub fn full_target_config() -> TargetConfig {
    TargetConfig {
        instance_id: Some(INSTANCE_ID.to_string()),
        topic_arn: Some(TOPIC_ARN.to_string()),
        app_url: Some(APP_URL.to_string()),
    }
}

pub fn request(alarm_name: &str) -> RemediationRequest {
    RemediationRequest::new(target(), &AlarmEvent::named(alarm_name))
}
