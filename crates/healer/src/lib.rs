//! Alarm-driven instance remediation.
//!
//! When an alarm fires for an instance, the healer:
//!
//! 1. checks that the instance is running or pending
//! 2. reboots it
//! 3. polls until it reports running again, a bounded number of times
//! 4. waits for services to start and checks the application once
//!
//! and sends one alert for any failure along the way. The state machine lives
//! in [`orchestrator`]; its collaborators are the traits in [`traits`], with
//! EC2, SNS and HTTP implementations wired up by [`Healer::from_config`].

pub mod action;
pub mod alerting;
pub mod clock;
pub mod config;
pub mod event;
pub mod handler;
pub mod locks;
pub mod orchestrator;
pub mod probes;
pub mod result;
pub mod server;
pub mod traits;
pub mod types;

pub use alerting::{AlertComposer, AlertKind};
pub use config::{ConfigError, HealerConfig, RunTarget, TargetConfig, Timings};
pub use event::{AlarmEvent, MetricKind};
pub use handler::Healer;
pub use locks::InstanceLocks;
pub use orchestrator::{Collaborators, Remediator};
pub use result::{RunResult, StatusClass};
pub use traits::{ActionError, AlertSink, ApplicationProbe, Clock, InstanceProbe, RebootAction};
pub use types::{AppHealth, OutcomeKind, RemediationOutcome, RemediationRequest};
