//! Environment-driven configuration structures shared by all binaries.

use std::{env, time::Duration};

use thiserror::Error;

/// API-specific configuration (HTTP bind + database).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    database_url: String,
    api_bind_address: String,
    internal_bind_address: Option<String>,
}

impl ApiConfig {
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        Ok(Self {
            database_url: get_required_var("DATABASE_URL")?,
            api_bind_address: get_required_var("API_BIND_ADDRESS")?,
            internal_bind_address: get_optional_var("API_INTERNAL_BIND_ADDRESS"),
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn api_bind_address(&self) -> &str {
        &self.api_bind_address
    }

    pub fn internal_bind_address(&self) -> Option<&str> {
        self.internal_bind_address.as_deref()
    }

    pub fn has_internal_listener(&self) -> bool {
        self.internal_bind_address.is_some()
    }
}

/// Endpoints and timeout for the external address and breed services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupConfig {
    viacep_base_url: String,
    dog_api_base_url: String,
    timeout: Duration,
}

impl LookupConfig {
    pub const DEFAULT_VIACEP_BASE_URL: &'static str = "https://viacep.com.br";
    pub const DEFAULT_DOG_API_BASE_URL: &'static str = "https://dogapi.dog/api/v2";
    pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;

    /// Every variable is optional; malformed timeouts surface as
    /// `ConfigError::InvalidNumber`.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        hydrate_env_file()?;

        let timeout_ms = match get_optional_var("LOOKUP_TIMEOUT_MS") {
            Some(raw) => parse_positive(&raw, "LOOKUP_TIMEOUT_MS")?,
            None => Self::DEFAULT_TIMEOUT_MS,
        };

        Ok(Self {
            viacep_base_url: get_optional_var("VIACEP_BASE_URL")
                .unwrap_or_else(|| Self::DEFAULT_VIACEP_BASE_URL.to_string()),
            dog_api_base_url: get_optional_var("DOG_API_BASE_URL")
                .unwrap_or_else(|| Self::DEFAULT_DOG_API_BASE_URL.to_string()),
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn new(
        viacep_base_url: impl Into<String>,
        dog_api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            viacep_base_url: viacep_base_url.into(),
            dog_api_base_url: dog_api_base_url.into(),
            timeout,
        }
    }

    pub fn viacep_base_url(&self) -> &str {
        &self.viacep_base_url
    }

    pub fn dog_api_base_url(&self) -> &str {
        &self.dog_api_base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn parse_positive(raw: &str, key: &'static str) -> Result<u64, ConfigError> {
    let value: u64 = raw
        .parse()
        .map_err(|source| ConfigError::InvalidNumber { key, source })?;
    if value == 0 {
        return Err(ConfigError::NonPositive { key });
    }
    Ok(value)
}

fn get_required_var(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(ConfigError::MissingVar { key })
            } else {
                Ok(trimmed.to_string())
            }
        }
        Err(_) => Err(ConfigError::MissingVar { key }),
    }
}

pub(crate) fn get_optional_var(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

pub fn hydrate_env_file() -> Result<(), ConfigError> {
    if env::var_os("PETCARE_SKIP_DOTENV").is_some() {
        return Ok(());
    }
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(ConfigError::Dotenv { source: err }),
    }

    Ok(())
}

/// Errors emitted when `.env` hydration or environment parsing fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable `{key}`")]
    MissingVar { key: &'static str },
    #[error("invalid integer in `{key}`: {source}")]
    InvalidNumber {
        key: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("`{key}` must be greater than zero")]
    NonPositive { key: &'static str },
    #[error("failed to load .env file: {source}")]
    Dotenv {
        #[from]
        source: dotenvy::Error,
    },
}

/// Serializes every test in this crate that mutates the process
/// environment.
#[cfg(test)]
pub(crate) static ENV_GUARD: std::sync::Mutex<()> = std::sync::Mutex::new(());
