pub mod customers;
pub mod lookups;
pub mod metrics;
pub mod pets;

pub use customers::{
    create_customer_handler, delete_customer_handler, get_customer_handler,
    list_customers_handler, update_customer_handler,
};
pub use lookups::{address_handler, breed_handler};
pub use metrics::metrics_handler;
pub use pets::{attach_pet_handler, list_pets_handler};

use actix_web::{
    error::{JsonPayloadError, PathError},
    http::StatusCode,
    web, HttpResponse, ResponseError,
};
use ::metrics::counter;
use petcare_domain::lookup::LookupError;
use petcare_domain::model::{BreedIdError, CustomerId, PostalCodeError};
use petcare_domain::services::customers::ServiceError;
use petcare_domain::storage::StorageError;
use serde::{Deserialize, Serialize};
use strum_macros::IntoStaticStr;
use thiserror::Error;
use tracing::error;

/// Registers the versioned REST routes and their extractor error handlers.
/// Mounted under `/api/v1`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .service(
        web::resource("/customers")
            .route(web::get().to(list_customers_handler))
            .route(web::post().to(create_customer_handler)),
    )
    .service(
        web::resource("/customers/{id}")
            .route(web::get().to(get_customer_handler))
            .route(web::put().to(update_customer_handler))
            .route(web::delete().to(delete_customer_handler)),
    )
    .route("/customers/{id}/pets", web::get().to(list_pets_handler))
    .route(
        "/customers/{id}/pets/{breed_id}",
        web::post().to(attach_pet_handler),
    )
    .route("/addresses/{postal_code}", web::get().to(address_handler))
    .route("/breeds/{breed_id}", web::get().to(breed_handler));
}

/// Malformed bodies and path parameters answer with the same error shape as
/// every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req| {
        ApiError::InvalidBody(err.to_string()).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err: PathError, _req| ApiError::InvalidPath(err.to_string()).into())
}

#[derive(Debug, Error, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("invalid path parameter: {0}")]
    InvalidPath(String),
    #[error("invalid postal code: {0}")]
    InvalidPostalCode(#[from] PostalCodeError),
    #[error("invalid breed id: {0}")]
    InvalidBreed(#[from] BreedIdError),
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),
    #[error("{0} not found")]
    LookupMiss(String),
    #[error("{0} could not be resolved")]
    Unresolvable(String),
    #[error("upstream lookup failed: {0}")]
    Upstream(LookupError),
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Direct lookups report a miss as 404; lookups made on behalf of a write
    /// go through `From<ServiceError>` and report 422 instead.
    pub fn from_lookup(err: LookupError) -> Self {
        match err {
            LookupError::NotFound(subject) => ApiError::LookupMiss(subject),
            other => ApiError::Upstream(other),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(id) => ApiError::CustomerNotFound(id),
            ServiceError::Lookup(LookupError::NotFound(subject)) => {
                ApiError::Unresolvable(subject)
            }
            ServiceError::Lookup(other) => ApiError::Upstream(other),
            ServiceError::Storage(err) => ApiError::Storage(err),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(_)
            | ApiError::InvalidPath(_)
            | ApiError::InvalidPostalCode(_)
            | ApiError::InvalidBreed(_) => StatusCode::BAD_REQUEST,
            ApiError::CustomerNotFound(_) | ApiError::LookupMiss(_) => StatusCode::NOT_FOUND,
            ApiError::Unresolvable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let kind: &'static str = self.into();
        counter!("api_errors_total", "kind" => kind).increment(1);
        if let ApiError::Storage(err) = self {
            error!(%err, "request failed on storage");
        }

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
