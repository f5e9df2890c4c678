use std::{net::SocketAddr, sync::Arc};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{get_optional_var, hydrate_env_file};

static SUBSCRIBER_INSTALLED: OnceCell<()> = OnceCell::new();
static METRICS_HANDLE: OnceCell<Arc<PrometheusHandle>> = OnceCell::new();

/// Logging and metrics settings of one binary, read from
/// `<PREFIX>_LOG_FILTER` and `<PREFIX>_METRICS_ADDRESS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    log_filter: String,
    metrics_listener: Option<SocketAddr>,
}

impl TelemetryConfig {
    pub const DEFAULT_LOG_FILTER: &'static str = "info";

    /// Blank values count as unset. A metrics address that does not parse
    /// is rejected here rather than when the recorder is installed.
    pub fn from_env(prefix: &str) -> Result<Self, TelemetryError> {
        hydrate_env_file().map_err(|err| TelemetryError::Env(err.to_string()))?;
        let prefix = prefix.trim().to_ascii_uppercase();

        let log_filter = get_optional_var(&format!("{prefix}_LOG_FILTER"))
            .unwrap_or_else(|| Self::DEFAULT_LOG_FILTER.to_string());
        let metrics_listener = get_optional_var(&format!("{prefix}_METRICS_ADDRESS"))
            .map(|raw| {
                raw.parse::<SocketAddr>()
                    .map_err(|err| TelemetryError::InvalidMetricsAddress(raw, err.to_string()))
            })
            .transpose()?;

        Ok(Self {
            log_filter,
            metrics_listener,
        })
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    pub fn metrics_listener(&self) -> Option<SocketAddr> {
        self.metrics_listener
    }
}

/// Handle to the process-wide Prometheus recorder.
#[derive(Clone)]
pub struct TelemetryGuard {
    metrics: Arc<PrometheusHandle>,
}

impl TelemetryGuard {
    pub fn render_metrics(&self) -> String {
        self.metrics.render()
    }
}

/// Installs the tracing subscriber and the Prometheus recorder. Later calls
/// reuse whatever the first call installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    install_tracing(config.log_filter())?;
    let metrics = METRICS_HANDLE
        .get_or_try_init(|| install_recorder(config.metrics_listener()))?
        .clone();

    Ok(TelemetryGuard { metrics })
}

fn install_tracing(filter: &str) -> Result<(), TelemetryError> {
    if SUBSCRIBER_INSTALLED.get().is_some() {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_new(filter).map_err(|err| TelemetryError::InvalidLogFilter(err.to_string()))?;

    if SUBSCRIBER_INSTALLED.set(()).is_ok() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
            .map_err(|err| TelemetryError::Tracing(err.to_string()))?;
    }

    Ok(())
}

fn install_recorder(listener: Option<SocketAddr>) -> Result<Arc<PrometheusHandle>, TelemetryError> {
    let builder = match listener {
        Some(addr) => PrometheusBuilder::new().with_http_listener(addr),
        None => PrometheusBuilder::new(),
    };
    builder
        .install_recorder()
        .map(Arc::new)
        .map_err(|err| TelemetryError::Metrics(err.to_string()))
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to read environment: {0}")]
    Env(String),
    #[error("invalid log filter: {0}")]
    InvalidLogFilter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Tracing(String),
    #[error("invalid metrics address `{0}`: {1}")]
    InvalidMetricsAddress(String, String),
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ENV_GUARD;
    use std::env;

    fn clear(prefix: &str) {
        env::set_var("PETCARE_SKIP_DOTENV", "1");
        env::remove_var(format!("{prefix}_LOG_FILTER"));
        env::remove_var(format!("{prefix}_METRICS_ADDRESS"));
    }

    #[test]
    fn unset_values_fall_back_to_defaults() {
        let _guard = ENV_GUARD.lock().unwrap_or_else(|err| err.into_inner());
        clear("PETS_TELEMETRY");

        let config = TelemetryConfig::from_env("pets_telemetry").unwrap();
        assert_eq!(config.log_filter(), TelemetryConfig::DEFAULT_LOG_FILTER);
        assert_eq!(config.metrics_listener(), None);
    }

    #[test]
    fn prefixed_values_are_read_and_trimmed() {
        let _guard = ENV_GUARD.lock().unwrap_or_else(|err| err.into_inner());
        clear("PETS_TELEMETRY");
        env::set_var("PETS_TELEMETRY_LOG_FILTER", " petcare_domain=debug ");
        env::set_var("PETS_TELEMETRY_METRICS_ADDRESS", "127.0.0.1:9898");

        let config = TelemetryConfig::from_env("PETS_TELEMETRY").unwrap();
        assert_eq!(config.log_filter(), "petcare_domain=debug");
        assert_eq!(
            config.metrics_listener(),
            Some("127.0.0.1:9898".parse().unwrap())
        );
        clear("PETS_TELEMETRY");
    }

    #[test]
    fn blank_metrics_address_disables_listener() {
        let _guard = ENV_GUARD.lock().unwrap_or_else(|err| err.into_inner());
        clear("PETS_TELEMETRY");
        env::set_var("PETS_TELEMETRY_METRICS_ADDRESS", "  ");

        let config = TelemetryConfig::from_env("PETS_TELEMETRY").unwrap();
        assert_eq!(config.metrics_listener(), None);
        clear("PETS_TELEMETRY");
    }

    #[test]
    fn malformed_metrics_address_is_rejected() {
        let _guard = ENV_GUARD.lock().unwrap_or_else(|err| err.into_inner());
        clear("PETS_TELEMETRY");
        env::set_var("PETS_TELEMETRY_METRICS_ADDRESS", "localhost");

        let err = TelemetryConfig::from_env("PETS_TELEMETRY").unwrap_err();
        assert!(matches!(err, TelemetryError::InvalidMetricsAddress(raw, _) if raw == "localhost"));
        clear("PETS_TELEMETRY");
    }
}
