//! This is a stresstest library which runs [`Workload`]s against the run endpoint of a
//! benchmark flow.
//!
//! Every workload simulates a number of virtual users. Each user sends a run request, waits for
//! the response and immediately sends the next one until the test duration elapses. All requests
//! go to the single flow created by the `flowbench` provisioner and are authorized with its API
//! key.
//!
//! Latencies are recorded in a sketch and printed as percentiles once all workloads finished.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod http;
pub mod stresstest;
pub mod workload;

pub use crate::stresstest::{Summary, run};
pub use crate::workload::Workload;
