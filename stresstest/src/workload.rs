//! A module for defining a [`Workload`] that drives load against the benchmark flow.

use std::num::NonZeroUsize;
use std::thread::available_parallelism;

use flowbench_types::flow::RunRequest;

/// A builder for creating a [`Workload`].
#[derive(Debug)]
pub struct WorkloadBuilder {
    name: String,
    users: usize,
    input_value: Option<String>,
}

impl WorkloadBuilder {
    /// The number of virtual users, each keeping one request in flight at a time.
    pub fn users(mut self, users: usize) -> Self {
        self.users = users;
        self
    }

    /// The chat input sent with every run request.
    pub fn input_value(mut self, input_value: impl Into<String>) -> Self {
        self.input_value = Some(input_value.into());
        self
    }

    /// Creates the workload instance.
    pub fn build(self) -> Workload {
        let request = match self.input_value {
            Some(input_value) => RunRequest::text(input_value),
            None => RunRequest::default(),
        };

        Workload {
            name: self.name,
            users: self.users,
            request,
        }
    }
}

/// A load pattern that can be run against the benchmark flow.
#[derive(Debug)]
pub struct Workload {
    /// Name of the workload for identification in metrics.
    pub(crate) name: String,
    /// The number of concurrent virtual users.
    pub(crate) users: usize,
    /// The payload of every run request.
    pub(crate) request: RunRequest,
}

impl Workload {
    /// Constructs a new workload builder with the given name.
    ///
    /// Defaults to one virtual user per available CPU and the default run payload.
    pub fn builder(name: impl Into<String>) -> WorkloadBuilder {
        WorkloadBuilder {
            name: name.into(),
            users: available_parallelism().map_or(1, NonZeroUsize::get),
            input_value: None,
        }
    }
}
