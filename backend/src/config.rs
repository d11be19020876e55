//! Service configuration loaded via OrthoConfig.
//!
//! Every value can come from the command line, a config file, or
//! `USER_INTENTS_*` environment variables. Accessors apply defaults and
//! reject values the service cannot start with.

use std::fmt;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::outbound::persistence::DEFAULT_USERS_TABLE;
use crate::outbound::text::{DEFAULT_ANTHROPIC_ENDPOINT, DEFAULT_ANTHROPIC_MODEL};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_REDIS_POOL_SIZE: u32 = 8;

/// Settings that cannot be used to start the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// Loading from CLI, file, or environment failed.
    #[error("failed to load settings: {message}")]
    Load { message: String },
    /// A timeout was configured as zero.
    #[error("{setting} must be greater than zero")]
    ZeroValue { setting: &'static str },
    /// The host is blank.
    #[error("host must not be empty")]
    EmptyHost,
    /// The endpoint is not an absolute URL.
    #[error("anthropic_endpoint '{value}' is not a valid URL: {message}")]
    InvalidEndpoint { value: String, message: String },
}

/// Configuration values for the HTTP service and its adapters.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_INTENTS")]
pub struct ServiceSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Key-value table holding user records.
    pub users_table: Option<String>,
    /// Redis connection URL; the in-memory store is used when absent.
    pub redis_url: Option<String>,
    /// Maximum pooled Redis connections.
    pub redis_pool_size: Option<u32>,
    /// Anthropic API key; the offline keyword classifier is used when absent.
    pub anthropic_api_key: Option<String>,
    /// Anthropic model name.
    pub anthropic_model: Option<String>,
    /// Anthropic Messages API endpoint.
    pub anthropic_endpoint: Option<String>,
    /// Timeout for one text-understanding call, in seconds.
    pub llm_timeout_secs: Option<u64>,
    /// Deadline for one `/ai` pipeline run, in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl fmt::Debug for ServiceSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("users_table", &self.users_table)
            .field("redis_url", &self.redis_url.as_ref().map(|_| "<configured>"))
            .field("redis_pool_size", &self.redis_pool_size)
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("anthropic_model", &self.anthropic_model)
            .field("anthropic_endpoint", &self.anthropic_endpoint)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn positive_secs(value: Option<u64>, default: u64, setting: &'static str) -> Result<Duration, SettingsError> {
    match value.unwrap_or(default) {
        0 => Err(SettingsError::ZeroValue { setting }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

impl ServiceSettings {
    /// Load settings from `args` (the first item is the program name),
    /// the environment, and any config file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Load`] when a source cannot be parsed.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::load_from_iter(args).map_err(|err| SettingsError::Load {
            message: err.to_string(),
        })
    }

    /// Check every value the service needs at start-up.
    ///
    /// # Errors
    ///
    /// Returns the first [`SettingsError`] found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.bind_addr()?;
        self.llm_timeout()?;
        self.request_timeout()?;
        self.redis_pool_size()?;
        self.anthropic_endpoint()?;
        Ok(())
    }

    /// Host and port to bind.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::EmptyHost`] for a blank host.
    pub fn bind_addr(&self) -> Result<(String, u16), SettingsError> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST).trim();
        if host.is_empty() {
            return Err(SettingsError::EmptyHost);
        }
        Ok((host.to_owned(), self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Table holding user records.
    pub fn users_table(&self) -> &str {
        self.users_table.as_deref().unwrap_or(DEFAULT_USERS_TABLE)
    }

    /// Maximum pooled Redis connections.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroValue`] for a zero pool.
    pub fn redis_pool_size(&self) -> Result<u32, SettingsError> {
        match self.redis_pool_size.unwrap_or(DEFAULT_REDIS_POOL_SIZE) {
            0 => Err(SettingsError::ZeroValue {
                setting: "redis_pool_size",
            }),
            size => Ok(size),
        }
    }

    /// Model requested from the Messages API.
    pub fn anthropic_model(&self) -> &str {
        self.anthropic_model
            .as_deref()
            .unwrap_or(DEFAULT_ANTHROPIC_MODEL)
    }

    /// Messages API endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidEndpoint`] when the value does not parse.
    pub fn anthropic_endpoint(&self) -> Result<Url, SettingsError> {
        let value = self
            .anthropic_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_ANTHROPIC_ENDPOINT);
        Url::parse(value).map_err(|err| SettingsError::InvalidEndpoint {
            value: value.to_owned(),
            message: err.to_string(),
        })
    }

    /// Timeout for one text-understanding call.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroValue`] for a zero timeout.
    pub fn llm_timeout(&self) -> Result<Duration, SettingsError> {
        positive_secs(
            self.llm_timeout_secs,
            DEFAULT_LLM_TIMEOUT_SECS,
            "llm_timeout_secs",
        )
    }

    /// Deadline for one `/ai` pipeline run.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroValue`] for a zero deadline.
    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        positive_secs(
            self.request_timeout_secs,
            DEFAULT_REQUEST_TIMEOUT_SECS,
            "request_timeout_secs",
        )
    }
}
