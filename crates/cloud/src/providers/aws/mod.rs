//! AWS (Amazon Web Services) compute provider.
//!
//! Implements the [`ComputeProvider`](super::ComputeProvider) trait for EC2.
//!
//! ## API calls
//!
//! - **DescribeInstanceStatus** - lifecycle state of a single instance
//! - **RebootInstances** - asynchronous reboot request
//!
//! Requests are sent to `https://ec2.{region}.amazonaws.com` unless an
//! endpoint override is configured (`AWS_ENDPOINT_URL`), which is how local
//! emulators and signing proxies are wired in.

mod client;
mod models;

pub use client::Ec2;
pub use models::*;
