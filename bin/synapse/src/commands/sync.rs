use std::sync::Arc;
use tracing::info;

use synapse_core::{Config, Paths};
use synapse_gateway::{
    AuthGateway, GatewayRequest, HttpAuthApi, InMemoryTokenStore, ReqwestDispatch,
};
use synapse_storage::MemoryStore;

/// Push local memory statistics to the insight service through the
/// authenticated gateway. Tokens come from the environment; the gateway
/// handles bearer injection and the one-shot refresh on 401.
pub async fn run() -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = Config::load_or_default(&paths)?;

    let access = std::env::var("SYNAPSE_ACCESS_TOKEN").unwrap_or_default();
    let refresh = std::env::var("SYNAPSE_REFRESH_TOKEN").unwrap_or_default();
    if access.is_empty() {
        anyhow::bail!("SYNAPSE_ACCESS_TOKEN is not set");
    }

    let gateway = AuthGateway::new(
        Arc::new(ReqwestDispatch::new()),
        Arc::new(InMemoryTokenStore::with_tokens(&access, &refresh)),
        Arc::new(HttpAuthApi::new(&config.auth.base_url)),
        config.auth.auth_paths.clone(),
    );

    let memory = MemoryStore::new(&config.memory);
    let file = paths.memory_file();
    if file.exists() {
        let items: Vec<synapse_storage::MemoryItem> =
            serde_json::from_str(&std::fs::read_to_string(&file)?)?;
        for item in items.into_iter().rev() {
            memory.store(item);
        }
    }
    let stats = memory.stats();

    let request = GatewayRequest::post(
        &format!("{}/api/insights", config.auth.base_url.trim_end_matches('/')),
        serde_json::json!({
            "totalItems": stats.total_items,
            "totalSize": stats.total_size,
            "oldestEntry": stats.oldest_entry,
            "newestEntry": stats.newest_entry,
        }),
    );

    let response = gateway.execute(&request).await?;
    if response.is_success() {
        info!(status = response.status, "insight sync accepted");
        println!("Synced {} item(s).", stats.total_items);
    } else {
        anyhow::bail!(
            "insight service returned {}: {}",
            response.status,
            response.body
        );
    }
    Ok(())
}
