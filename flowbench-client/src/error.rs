use reqwest::StatusCode;

/// Maximum number of bytes of a response body kept in [`Error::Status`].
const MAX_BODY_EXCERPT: usize = 200;

/// Errors that can happen within the flowbench-client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Any error emitted from the underlying [`reqwest`] client, including timeouts.
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    /// The service answered with a non-success status code.
    #[error("service responded with {status}: {body}")]
    Status {
        /// The status code of the response.
        status: StatusCode,
        /// The beginning of the response body.
        body: String,
    },
    /// The response body is not the expected JSON.
    #[error("malformed response body: {0}")]
    Json(#[from] serde_json::Error),
    /// The response is well-formed but lacks a required field.
    #[error("response has no `{field}` field")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// Error when URL manipulation fails.
    #[error("{message}")]
    InvalidUrl {
        /// The URL error message.
        message: String,
    },
}

impl Error {
    pub(crate) fn status(status: StatusCode, body: &str) -> Self {
        let mut end = body.len().min(MAX_BODY_EXCERPT);
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        // Keep diagnostics on a single line.
        let body = body[..end].split_whitespace().collect::<Vec<_>>().join(" ");
        Self::Status { status, body }
    }

    /// Returns `true` if the request failed because it timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Reqwest(err) if err.is_timeout())
    }
}

/// A convenience alias that defaults our [`Error`] type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
