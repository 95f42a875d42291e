//! Shared state for the web server.

use std::sync::Arc;

use wayback_client::{FetchClient, FetchConfig};
use wayback_core::{AppConfig, CacheTiers, MappingStore};

use crate::notifier;
use crate::proxy::Proxy;

#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<Proxy>,
    pub mappings: Arc<MappingStore>,
}

impl AppState {
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let mappings = MappingStore::load(&config.mappings_path).await?;

        for mapping in mappings.snapshot().await.iter() {
            tracing::info!(
                domain = %mapping.domain,
                archive_origin = %mapping.archive_origin,
                skip_root_page = mapping.skip_root_page,
                "domain mapping"
            );
        }

        let client = FetchClient::new(FetchConfig::from(config))?;
        let proxy = Proxy::new(
            client,
            Arc::new(CacheTiers::new()),
            notifier::from_config(config),
            config.base_path().map(str::to_string),
        );

        Ok(Self { proxy: Arc::new(proxy), mappings: Arc::new(mappings) })
    }
}
