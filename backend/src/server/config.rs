//! HTTP server configuration object and helpers.

use std::time::Duration;

use url::Url;

use user_intents::config::{ServiceSettings, SettingsError};
use user_intents::outbound::kv::RedisStoreOptions;

/// Text-understanding backend selected at start-up.
pub enum TextBackend {
    /// Hosted Messages API.
    Anthropic {
        api_key: String,
        model: String,
        endpoint: Url,
        timeout: Duration,
    },
    /// Offline regex classifier.
    Keywords,
}

/// Key-value store selected at start-up.
pub enum StoreBackend {
    /// Redis behind a connection pool.
    Redis {
        url: String,
        options: RedisStoreOptions,
    },
    /// Process-local tables.
    InMemory,
}

/// Validated configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: (String, u16),
    pub(crate) users_table: String,
    pub(crate) request_timeout: Duration,
    pub(crate) store: StoreBackend,
    pub(crate) text: TextBackend,
}

impl ServerConfig {
    /// Resolve defaults and validate `settings`.
    ///
    /// # Errors
    ///
    /// Returns the first [`SettingsError`] found.
    pub fn from_settings(settings: ServiceSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let store = match &settings.redis_url {
            Some(url) => StoreBackend::Redis {
                url: url.clone(),
                options: RedisStoreOptions {
                    pool_size: settings.redis_pool_size()?,
                    ..RedisStoreOptions::default()
                },
            },
            None => StoreBackend::InMemory,
        };
        let text = match &settings.anthropic_api_key {
            Some(api_key) => TextBackend::Anthropic {
                api_key: api_key.clone(),
                model: settings.anthropic_model().to_owned(),
                endpoint: settings.anthropic_endpoint()?,
                timeout: settings.llm_timeout()?,
            },
            None => TextBackend::Keywords,
        };
        Ok(Self {
            bind_addr: settings.bind_addr()?,
            users_table: settings.users_table().to_owned(),
            request_timeout: settings.request_timeout()?,
            store,
            text,
        })
    }

    /// Return the address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.bind_addr.0.as_str(), self.bind_addr.1)
    }
}
