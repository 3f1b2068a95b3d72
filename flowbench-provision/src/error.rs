//! Errors of a provisioning run.
//!
//! Every error is terminal. The variants follow the step that failed, so that the diagnostic
//! line printed by the binary names it.

use thiserror::Error;

/// Error type for provisioning runs.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// Superuser name or password is unset or empty. Raised before any network call.
    #[error(
        "missing superuser credentials: set LANGFLOW_SUPERUSER and LANGFLOW_SUPERUSER_PASSWORD"
    )]
    MissingCredentials,

    /// The configuration cannot be turned into a client, for example due to an invalid URL.
    #[error("invalid configuration")]
    InvalidConfig(#[source] flowbench_client::Error),

    /// The login request failed or was rejected.
    #[error("login failed")]
    Login(#[source] flowbench_client::Error),

    /// The login request succeeded but the response carried no usable token.
    #[error("login succeeded but no token returned")]
    MissingToken,

    /// Listing the existing API keys failed.
    #[error("listing api keys failed")]
    ListCredentials(#[source] flowbench_client::Error),

    /// Creating the API key failed.
    #[error("creating api key failed")]
    CreateCredential(#[source] flowbench_client::Error),

    /// Neither an existing nor a newly created API key yielded a secret value.
    #[error("could not obtain credential value")]
    MissingCredentialValue,

    /// Creating the benchmark flow failed.
    #[error("creating benchmark flow failed")]
    CreateFixture(#[source] flowbench_client::Error),

    /// The flow creation response carried no identifier.
    #[error("creating benchmark flow failed: response has no flow id")]
    MissingFixtureId,
}

impl ProvisionError {
    /// Returns `true` for errors raised before any request was sent.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::MissingCredentials | Self::InvalidConfig(_))
    }
}

/// Result type for provisioning steps.
pub type ProvisionResult<T> = Result<T, ProvisionError>;
