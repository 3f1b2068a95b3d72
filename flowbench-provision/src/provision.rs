//! The provisioning sequence.

use flowbench_types::BenchmarkData;

use crate::config::Config;
use crate::error::{ProvisionError, ProvisionResult};
use crate::{auth, credential, fixture};

/// Performs one provisioning run.
///
/// The steps run strictly in order and the first failure aborts the run:
///
/// 1. Validate the superuser credentials, before any request is sent.
/// 2. Log in and obtain a session.
/// 3. Reuse or create the benchmark API key.
/// 4. Create a new benchmark flow.
///
/// Nothing is written to standard output here; reporting is up to the caller.
pub async fn run(config: &Config) -> ProvisionResult<BenchmarkData> {
    let superuser = config.superuser()?;
    let client = config.client()?;

    tracing::info!(url = %config.url, "preparing benchmark fixture");
    let session = auth::authenticate(&client, superuser).await?;
    let api_key = credential::ensure_api_key(&session, &config.credential_name).await?;
    let flow_id = fixture::create_fixture(&session, &config.flow_name_prefix).await?;

    // Both steps reject empty values already.
    BenchmarkData::new(flow_id, api_key).ok_or(ProvisionError::MissingCredentialValue)
}
