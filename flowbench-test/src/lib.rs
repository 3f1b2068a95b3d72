//! Test utilities for flowbench and its clients.
//!
//! This crate provides utilities to facilitate testing against a Langflow-like service without
//! running one. See the modules for all available utilities.

pub mod server;
pub mod tracing;
