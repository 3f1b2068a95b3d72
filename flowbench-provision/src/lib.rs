//! Benchmark fixture provisioning for Langflow.
//!
//! A provisioning run logs in as the superuser, makes sure an API key named `benchmark_key`
//! exists, creates a fresh flow with an artificial delay step and reports both identifiers as
//! marker lines on standard output. See [`provision::run`] for the sequence of steps and
//! [`report`] for the output format.

pub mod auth;
pub mod cli;
pub mod config;
pub mod credential;
pub mod error;
pub mod fixture;
pub mod healthcheck;
pub mod observability;
pub mod provision;
pub mod report;

pub use error::{ProvisionError, ProvisionResult};
