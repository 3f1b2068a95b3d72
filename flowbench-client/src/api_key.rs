use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::Session;

/// Response fields that may carry the secret value of an API key, in probing order.
///
/// The creation endpoint returns the secret in `api_key`. The other names are accepted for
/// deployments that rename the field.
pub const SECRET_FIELDS: &[&str] = &["api_key", "key", "value"];

/// An API key entry as returned by the listing or creation endpoints.
///
/// The secret is redacted from [`Debug`] output.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ApiKey {
    /// The human readable name of the key, if present.
    pub name: Option<String>,
    /// The secret value, taken from the first non-empty field in [`SECRET_FIELDS`].
    pub secret: Option<String>,
}

impl From<Map<String, Value>> for ApiKey {
    fn from(object: Map<String, Value>) -> Self {
        let name = object.get("name").and_then(Value::as_str).map(str::to_owned);
        let secret = SECRET_FIELDS
            .iter()
            .filter_map(|field| object.get(*field)?.as_str())
            .find(|value| !value.is_empty())
            .map(str::to_owned);

        Self { name, secret }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("name", &self.name)
            .field("secret", &self.secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// The listing endpoint either returns a bare array or wraps it in an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ApiKeyListing {
    Wrapped { api_keys: Vec<ApiKey> },
    Bare(Vec<ApiKey>),
}

impl Session {
    /// Lists the API keys of the authenticated user.
    pub async fn list_api_keys(&self) -> crate::Result<Vec<ApiKey>> {
        let response = self
            .request(reqwest::Method::GET, "/api_key/")?
            .send()
            .await?;

        let keys = match crate::client::read_json(response).await? {
            ApiKeyListing::Wrapped { api_keys } => api_keys,
            ApiKeyListing::Bare(api_keys) => api_keys,
        };
        tracing::debug!(count = keys.len(), "listed api keys");
        Ok(keys)
    }

    /// Creates a new API key with the given name.
    ///
    /// The returned entry carries the secret as far as the response contained one. Whether a
    /// missing secret is an error is up to the caller.
    pub async fn create_api_key(&self, name: &str) -> crate::Result<ApiKey> {
        let response = self
            .request(reqwest::Method::POST, "/api_key/")?
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;

        crate::client::read_json(response).await
    }
}
