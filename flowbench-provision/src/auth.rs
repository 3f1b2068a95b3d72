//! Exchanges superuser credentials for a session.

use std::fmt;

use flowbench_client::{Client, Session};

use crate::error::{ProvisionError, ProvisionResult};

/// Superuser credentials, borrowed from the [`Config`](crate::config::Config).
#[derive(Clone, Copy)]
pub struct Superuser<'a> {
    /// The superuser name.
    pub username: &'a str,
    /// The superuser password.
    pub password: &'a str,
}

impl fmt::Debug for Superuser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Superuser")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Logs in as the superuser.
///
/// There is no retry. A rejected or malformed login fails with [`ProvisionError::Login`], a
/// successful login without a token with [`ProvisionError::MissingToken`].
pub async fn authenticate(client: &Client, superuser: Superuser<'_>) -> ProvisionResult<Session> {
    match client.login(superuser.username, superuser.password).await {
        Ok(session) => {
            tracing::info!(username = superuser.username, "logged in");
            Ok(session)
        }
        Err(flowbench_client::Error::MissingField { .. }) => Err(ProvisionError::MissingToken),
        Err(err) => Err(ProvisionError::Login(err)),
    }
}
