//! Builders for the ports behind HTTP state.

use std::sync::Arc;

use tracing::info;

use user_intents::domain::ports::{TextUnderstanding, UserRepository};
use user_intents::inbound::http::state::HttpStatePorts;
use user_intents::outbound::kv::{InMemoryKeyValueStore, KeyValueStore, RedisKeyValueStore};
use user_intents::outbound::persistence::KeyValueUserRepository;
use user_intents::outbound::text::{AnthropicTextUnderstanding, KeywordTextUnderstanding};

use super::config::{ServerConfig, StoreBackend, TextBackend};

async fn build_store(backend: &StoreBackend) -> std::io::Result<Arc<dyn KeyValueStore>> {
    match backend {
        StoreBackend::Redis { url, options } => {
            let store = RedisKeyValueStore::connect(url, *options)
                .await
                .map_err(|err| std::io::Error::other(format!("redis store unavailable: {err}")))?;
            info!(pool_size = options.pool_size, "using redis key-value store");
            Ok(Arc::new(store))
        }
        StoreBackend::InMemory => {
            info!("using in-memory key-value store");
            Ok(Arc::new(InMemoryKeyValueStore::new()))
        }
    }
}

fn build_text(backend: &TextBackend) -> std::io::Result<Arc<dyn TextUnderstanding>> {
    match backend {
        TextBackend::Anthropic {
            api_key,
            model,
            endpoint,
            timeout,
        } => {
            let client = AnthropicTextUnderstanding::new(
                endpoint.clone(),
                api_key.as_str(),
                model.as_str(),
                *timeout,
            )
            .map_err(|err| std::io::Error::other(format!("http client build failed: {err}")))?;
            info!(%model, "using anthropic text understanding");
            Ok(Arc::new(client))
        }
        TextBackend::Keywords => {
            info!("no API key configured; using keyword classifier");
            Ok(Arc::new(KeywordTextUnderstanding))
        }
    }
}

/// Build the port bundle described by `config`.
///
/// # Errors
///
/// Returns [`std::io::Error`] when the store cannot be reached or the HTTP
/// client cannot be built.
pub(crate) async fn build_http_ports(config: &ServerConfig) -> std::io::Result<HttpStatePorts> {
    let store = build_store(&config.store).await?;
    let users: Arc<dyn UserRepository> = Arc::new(KeyValueUserRepository::new(
        store,
        config.users_table.as_str(),
    ));
    let text = build_text(&config.text)?;
    Ok(HttpStatePorts { users, text })
}
