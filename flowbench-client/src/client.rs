use std::sync::Arc;
use std::time::Duration;

use reqwest::Response;
use serde::de::DeserializeOwned;
use url::Url;

const USER_AGENT: &str = concat!("flowbench-client/", env!("CARGO_PKG_VERSION"));

/// The path prefix of all versioned API endpoints.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// The timeout applied to every request unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct ClientBuilderInner {
    service_url: Url,
    api_prefix: String,
    reqwest_builder: reqwest::ClientBuilder,
}

/// Builder to create a [`Client`].
#[must_use]
#[derive(Debug)]
pub struct ClientBuilder(crate::Result<ClientBuilderInner>);

impl ClientBuilder {
    /// Creates a new [`ClientBuilder`], configured with the given `service_url`.
    ///
    /// The URL points at the root of the service, such as `http://localhost:7860`. API endpoints
    /// are resolved below the [API prefix](Self::api_prefix).
    pub fn new(service_url: impl reqwest::IntoUrl) -> Self {
        let service_url = match service_url.into_url() {
            Ok(url) => url,
            Err(err) => return Self(Err(err.into())),
        };

        let reqwest_builder = reqwest::Client::builder()
            .connect_timeout(DEFAULT_TIMEOUT)
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(USER_AGENT);

        Self(Ok(ClientBuilderInner {
            service_url,
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
            reqwest_builder,
        }))
    }

    /// Sets the path prefix of versioned API endpoints.
    ///
    /// Defaults to [`DEFAULT_API_PREFIX`].
    pub fn api_prefix(mut self, api_prefix: impl Into<String>) -> Self {
        if let Ok(ref mut inner) = self.0 {
            let api_prefix = api_prefix.into();
            let api_prefix = api_prefix.trim_end_matches('/');
            inner.api_prefix = if api_prefix.is_empty() || api_prefix.starts_with('/') {
                api_prefix.to_owned()
            } else {
                format!("/{api_prefix}")
            };
        }
        self
    }

    /// Sets both the connect timeout and the total request timeout.
    ///
    /// A request that exceeds the timeout fails with a [`reqwest::Error`] for which
    /// [`Error::is_timeout`](crate::Error::is_timeout) returns `true`.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.configure_reqwest(|builder| builder.connect_timeout(timeout).timeout(timeout))
    }

    /// Calls the closure with the underlying [`reqwest::ClientBuilder`].
    pub fn configure_reqwest<F>(self, closure: F) -> Self
    where
        F: FnOnce(reqwest::ClientBuilder) -> reqwest::ClientBuilder,
    {
        let Ok(inner) = self.0 else { return self };
        Self(Ok(ClientBuilderInner {
            service_url: inner.service_url,
            api_prefix: inner.api_prefix,
            reqwest_builder: closure(inner.reqwest_builder),
        }))
    }

    /// Returns a [`Client`] that uses this [`ClientBuilder`] configuration.
    ///
    /// # Errors
    ///
    /// This method fails if:
    /// - the given `service_url` is invalid or cannot be a base URL
    /// - the [`reqwest::Client`] fails to build. Refer to [`reqwest::ClientBuilder::build`] for
    ///   more information on when this can happen.
    pub fn build(self) -> crate::Result<Client> {
        let inner = self.0?;
        if inner.service_url.cannot_be_a_base() {
            return Err(crate::Error::InvalidUrl {
                message: format!("`{}` cannot be used as a service URL", inner.service_url),
            });
        }

        Ok(Client {
            inner: Arc::new(ClientInner {
                reqwest: inner.reqwest_builder.build()?,
                service_root: inner.service_url.as_str().trim_end_matches('/').to_owned(),
                api_prefix: inner.api_prefix,
            }),
        })
    }
}

#[derive(Debug)]
pub(crate) struct ClientInner {
    pub(crate) reqwest: reqwest::Client,
    service_root: String,
    api_prefix: String,
}

/// A client for the Langflow API. Use [`Client::builder`] to configure and construct this.
///
/// Unauthenticated endpoints are available directly on the client. Use [`Client::login`] to
/// obtain a [`Session`](crate::Session) for endpoints that require a bearer token.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl Client {
    /// Convenience function to create a [`ClientBuilder`].
    pub fn builder(service_url: impl reqwest::IntoUrl) -> ClientBuilder {
        ClientBuilder::new(service_url)
    }

    /// Returns the URL of an endpoint below the API prefix.
    ///
    /// `path` must start with a slash, for example `/flows/`.
    pub fn api_url(&self, path: &str) -> crate::Result<Url> {
        self.root_url(&format!("{}{path}", self.inner.api_prefix))
    }

    /// Returns the URL of an endpoint relative to the service root.
    pub fn root_url(&self, path: &str) -> crate::Result<Url> {
        let url = format!("{}{path}", self.inner.service_root);
        Url::parse(&url).map_err(|err| crate::Error::InvalidUrl {
            message: format!("invalid endpoint URL `{url}`: {err}"),
        })
    }

    /// The configured API prefix, without a trailing slash.
    pub fn api_prefix(&self) -> &str {
        &self.inner.api_prefix
    }

    /// Checks that the service reports itself as healthy.
    pub async fn health(&self) -> crate::Result<()> {
        let url = self.root_url("/health")?;
        tracing::debug!(%url, "sending health request");
        let response = self.inner.reqwest.get(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

/// Returns the response if its status indicates success, or an [`Error::Status`](crate::Error::Status).
pub(crate) async fn ensure_success(response: Response) -> crate::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(crate::Error::status(status, &body))
}

/// Checks the status and decodes a JSON body.
///
/// The body is read in full before decoding, so that malformed bodies surface as
/// [`Error::Json`](crate::Error::Json) rather than transport errors.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> crate::Result<T> {
    let response = ensure_success(response).await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
