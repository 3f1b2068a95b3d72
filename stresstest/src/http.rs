//! Contains a remote implementation using HTTP to run the benchmark flow.

use flowbench_client::{Client, ClientBuilder};
use flowbench_types::BenchmarkData;
use flowbench_types::flow::RunRequest;

/// A remote implementation using HTTP to run the benchmark flow.
#[derive(Debug)]
pub struct HttpRemote {
    /// The client used to talk to the service.
    pub client: Client,
    target: Option<BenchmarkData>,
}

impl HttpRemote {
    /// Creates a new `HttpRemote` for the given service URL with default client settings.
    pub fn new(remote: &str) -> flowbench_client::Result<Self> {
        Ok(Self::with_client(ClientBuilder::new(remote).build()?))
    }

    /// Creates a new `HttpRemote` using a preconfigured client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            target: None,
        }
    }

    /// Sets the flow and API key to run.
    ///
    /// Without a target, every iteration is skipped and no requests are sent.
    pub fn with_target(mut self, target: BenchmarkData) -> Self {
        self.target = Some(target);
        self
    }

    /// Returns whether a flow and API key are configured.
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// The name all run requests are reported under, independent of the flow identifier.
    pub fn metric_name(&self) -> String {
        format!("{}/run/[flow_id]", self.client.api_prefix())
    }

    /// Runs the flow once and returns the size of the response body.
    ///
    /// Returns `None` if no target is configured.
    pub(crate) async fn run(&self, request: &RunRequest) -> Option<flowbench_client::Result<u64>> {
        let target = self.target.as_ref()?;
        let result = self
            .client
            .run_flow(target.flow_id(), target.api_key(), request)
            .await;
        Some(result)
    }
}
