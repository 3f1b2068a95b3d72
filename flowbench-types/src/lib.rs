//! Shared types for the flowbench provisioner, its client and the stresstest.
//!
//! - [`flow`] holds the wire format of workflow graphs and run requests.
//! - [`markers`] defines the line format used to hand provisioned identifiers to a driver.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod flow;
pub mod markers;

pub use markers::BenchmarkData;
