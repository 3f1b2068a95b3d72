use std::fmt;

use serde::Deserialize;

use crate::Client;
use crate::client::ClientInner;

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
}

impl Client {
    /// Exchanges superuser credentials for a bearer token.
    ///
    /// Sends a form-encoded password grant to the `/login` endpoint. A response without a
    /// non-empty `access_token` fails with [`Error::MissingField`](crate::Error::MissingField).
    pub async fn login(&self, username: &str, password: &str) -> crate::Result<Session> {
        let url = self.api_url("/login")?;
        tracing::debug!(%url, username, "sending login request");

        let response = self
            .inner
            .reqwest
            .post(url)
            .form(&[
                ("username", username),
                ("password", password),
                ("grant_type", "password"),
            ])
            .send()
            .await?;

        let LoginResponse { access_token } = crate::client::read_json(response).await?;
        let token = access_token
            .filter(|token| !token.is_empty())
            .ok_or(crate::Error::MissingField {
                field: "access_token",
            })?;

        Ok(Session {
            client: self.clone(),
            token,
        })
    }
}

/// An authenticated session holding a bearer token.
///
/// Sessions are never persisted. The token is redacted from [`Debug`] output.
#[derive(Clone)]
pub struct Session {
    client: Client,
    token: String,
}

impl Session {
    /// Creates a session from an already issued bearer token.
    pub fn with_token(client: Client, token: impl Into<String>) -> Self {
        Self {
            client,
            token: token.into(),
        }
    }

    /// The client this session was created from.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn inner(&self) -> &ClientInner {
        &self.client.inner
    }

    pub(crate) fn request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> crate::Result<reqwest::RequestBuilder> {
        let url = self.client.api_url(path)?;
        Ok(self
            .inner()
            .reqwest
            .request(method, url)
            .bearer_auth(&self.token))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("client", &self.client)
            .field("token", &"[redacted]")
            .finish()
    }
}
