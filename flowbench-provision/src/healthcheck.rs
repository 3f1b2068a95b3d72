use anyhow::Result;

use crate::config::Config;

/// Checks that the configured Langflow instance is reachable and healthy.
pub async fn healthcheck(config: &Config) -> Result<()> {
    let client = config.client()?;

    tracing::debug!(url = %config.url, "sending healthcheck request");
    client.health().await?;

    tracing::info!("OK");
    Ok(())
}
