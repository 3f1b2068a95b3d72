use serde::Deserialize;

use flowbench_types::flow::NewFlow;

use crate::Session;

/// The response to a flow creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedFlow {
    /// The identifier assigned by the service.
    pub id: String,
}

#[derive(Deserialize)]
struct FlowResponse {
    #[serde(default)]
    id: Option<String>,
}

impl Session {
    /// Creates a new flow.
    ///
    /// This always creates a new resource; existing flows with the same name are neither looked
    /// up nor updated. A response without a non-empty `id` fails with
    /// [`Error::MissingField`](crate::Error::MissingField).
    pub async fn create_flow(&self, flow: &NewFlow) -> crate::Result<CreatedFlow> {
        let response = self
            .request(reqwest::Method::POST, "/flows/")?
            .json(flow)
            .send()
            .await?;

        let FlowResponse { id } = crate::client::read_json(response).await?;
        let id = id
            .filter(|id| !id.is_empty())
            .ok_or(crate::Error::MissingField { field: "id" })?;

        tracing::debug!(%id, name = %flow.name, "created flow");
        Ok(CreatedFlow { id })
    }
}
