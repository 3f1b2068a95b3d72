//! # Flowbench Client
//!
//! A small async client for the parts of the Langflow API that benchmark preparation and load
//! generation need: password login, API key listing and creation, flow creation and flow runs.
//!
//! ## Usage
//!
//! ```no_run
//! use flowbench_client::Client;
//!
//! # async fn example() -> flowbench_client::Result<()> {
//! let client = Client::builder("http://localhost:7860").build()?;
//! let session = client.login("admin", "secret").await?;
//! let keys = session.list_api_keys().await?;
//! # let _ = keys;
//! # Ok(())
//! # }
//! ```
//!
//! Every call is a single request without retries. Non-success responses are surfaced as
//! [`Error::Status`], response bodies that are not valid JSON as [`Error::Json`].
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod api_key;
mod auth;
mod client;
mod error;
mod flow;
mod run;

pub use flowbench_types::flow::{NewFlow, RunRequest};

pub use api_key::*;
pub use auth::*;
pub use client::*;
pub use error::*;
pub use flow::*;
pub use run::*;

#[cfg(test)]
mod tests;
