//! Compute provider integration for instance remediation.
//!
//! This crate exposes the two provider calls the remediation workflow needs:
//!
//! - **Status lookup** - the current lifecycle state of one instance
//! - **Reboot** - a fire-and-forget reboot command for one instance
//!
//! ## Providers
//!
//! - **AWS** - EC2 (`DescribeInstanceStatus`, `RebootInstances`)
//!
//! Callers depend on the [`ComputeProvider`] trait so the provider can be
//! swapped for a test double.

pub mod providers;

pub use providers::{aws, ComputeProvider, CloudProviderError, Ec2, InstanceState};
