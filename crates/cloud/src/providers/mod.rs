//! Compute provider abstractions.
//!
//! This module defines the common trait and types for compute providers.

pub mod aws;
mod traits;

pub use traits::{CloudProviderError, ComputeProvider, InstanceState};

// Re-export provider clients
pub use aws::Ec2;
