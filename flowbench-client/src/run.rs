use flowbench_types::flow::RunRequest;

use crate::Client;

/// Header carrying the API key on run requests.
pub const API_KEY_HEADER: &str = "x-api-key";

impl Client {
    /// Runs a flow once, authorized by an API key.
    ///
    /// The request asks for a non-streaming response, which is read in full. Returns the number
    /// of response body bytes.
    pub async fn run_flow(
        &self,
        flow_id: &str,
        api_key: &str,
        request: &RunRequest,
    ) -> crate::Result<u64> {
        let url = self.api_url(&format!("/run/{flow_id}"))?;
        let response = self
            .inner
            .reqwest
            .post(url)
            .query(&[("stream", "false")])
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await?;

        let response = crate::client::ensure_success(response).await?;
        let body = response.bytes().await?;
        Ok(body.len() as u64)
    }
}
