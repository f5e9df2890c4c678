use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use petcare_domain::config::{ApiConfig, ConfigError, LookupConfig};
use petcare_domain::lookup::LookupError;
use petcare_domain::services::{
    cache::AddressMemo,
    customers::CustomerService,
    telemetry::{init_telemetry, TelemetryConfig, TelemetryError},
};
use petcare_domain::storage::StorageError;
use petcare_lookup::{DogApiClient, ViaCepClient};
use petcare_storage::SeaOrmStorage;
use thiserror::Error;
use tracing::info;

use crate::{
    handlers::{self, metrics_handler},
    state::AppState,
};

pub async fn run() -> Result<(), BootstrapError> {
    let config = ApiConfig::load_from_env()?;
    let lookup_config = LookupConfig::load_from_env()?;

    let telemetry_config = TelemetryConfig::from_env("API")?;
    let telemetry = init_telemetry(&telemetry_config)?;

    let storage = SeaOrmStorage::connect(config.database_url()).await?;

    let addresses = ViaCepClient::from_config(&lookup_config)?;
    let breeds = DogApiClient::from_config(&lookup_config)?;
    let customers = CustomerService::new(storage, Arc::new(addresses), AddressMemo::default());

    let state = AppState::new(customers, Arc::new(breeds), telemetry);

    let include_metrics_on_public = !config.has_internal_listener();
    let public_state = state.clone();

    let public_server = HttpServer::new(move || {
        let mut app = App::new()
            .app_data(web::Data::new(public_state.clone()))
            .wrap(Logger::default())
            .service(web::scope("/api/v1").configure(handlers::configure));

        if include_metrics_on_public {
            app = app.route("/metrics", web::get().to(metrics_handler));
        }

        app
    })
    .bind(config.api_bind_address())?;
    info!(address = config.api_bind_address(), "public listener bound");
    let public_server = public_server.run();

    let internal_server = match config.internal_bind_address() {
        Some(addr) => {
            let internal_state = state.clone();
            let server = HttpServer::new(move || {
                App::new()
                    .app_data(web::Data::new(internal_state.clone()))
                    .wrap(Logger::default())
                    .route("/metrics", web::get().to(metrics_handler))
            })
            .bind(addr)?;
            info!(address = addr, "internal listener bound");
            Some(server.run())
        }
        None => None,
    };

    if let Some(internal) = internal_server {
        tokio::try_join!(public_server, internal)?;
    } else {
        public_server.await?;
    }

    Ok(())
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("lookup client error: {0}")]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
