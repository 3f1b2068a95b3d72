//! Ensures that a named API key exists and obtains its secret.
//!
//! The policy is reuse-or-create. Listed keys are only reused if the listing exposes their
//! secret, which many deployments mask after creation. Otherwise a new key with the same name
//! is created, so repeated runs may accumulate keys on services that mask listings.

use flowbench_client::{ApiKey, Session};

use crate::error::{ProvisionError, ProvisionResult};

/// Returns the secret of an API key named `name`, reusing an existing key if possible.
///
/// # Errors
///
/// - [`ProvisionError::ListCredentials`] if the listing request fails
/// - [`ProvisionError::CreateCredential`] if the creation request fails
/// - [`ProvisionError::MissingCredentialValue`] if the created key carries no secret
pub async fn ensure_api_key(session: &Session, name: &str) -> ProvisionResult<String> {
    let existing = session
        .list_api_keys()
        .await
        .map_err(ProvisionError::ListCredentials)?;

    if let Some(secret) = find_reusable(&existing, name) {
        tracing::info!(credential = name, "reusing existing api key");
        return Ok(secret.to_owned());
    }

    tracing::debug!(
        credential = name,
        listed = existing.len(),
        "no reusable api key, creating one"
    );
    let created = session
        .create_api_key(name)
        .await
        .map_err(ProvisionError::CreateCredential)?;

    let secret = created
        .secret
        .filter(|secret| !secret.is_empty())
        .ok_or(ProvisionError::MissingCredentialValue)?;

    tracing::info!(credential = name, "created api key");
    Ok(secret)
}

/// Finds the secret of the first key named exactly `name` whose secret is retrievable.
fn find_reusable<'a>(keys: &'a [ApiKey], name: &str) -> Option<&'a str> {
    keys.iter()
        .filter(|key| key.name.as_deref() == Some(name))
        .filter_map(|key| key.secret.as_deref())
        .find(|secret| is_retrievable(secret))
}

/// Masked secrets, such as `sk-abcd********`, cannot be used to authorize requests.
fn is_retrievable(secret: &str) -> bool {
    !secret.is_empty() && !secret.contains('*')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str, secret: Option<&str>) -> ApiKey {
        ApiKey {
            name: Some(name.to_owned()),
            secret: secret.map(str::to_owned),
        }
    }

    #[test]
    fn reuses_exact_name_with_secret() {
        let keys = [
            key("benchmark_key_old", Some("sk-other")),
            key("benchmark_key", None),
            key("benchmark_key", Some("sk-reuse")),
        ];
        assert_eq!(find_reusable(&keys, "benchmark_key"), Some("sk-reuse"));
    }

    #[test]
    fn skips_masked_secrets() {
        let keys = [key("benchmark_key", Some("sk-abcd********"))];
        assert_eq!(find_reusable(&keys, "benchmark_key"), None);
    }

    #[test]
    fn nothing_to_reuse() {
        assert_eq!(find_reusable(&[], "benchmark_key"), None);

        let unnamed = ApiKey {
            name: None,
            secret: Some("sk-1".into()),
        };
        assert_eq!(find_reusable(&[unnamed], "benchmark_key"), None);
    }
}
