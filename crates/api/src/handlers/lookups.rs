use actix_web::{web, HttpResponse};
use petcare_domain::model::{Breed, BreedId, PostalCode};
use petcare_domain::services::customers::ServiceError;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::{customers::AddressResponse, ApiError};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BreedResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub hypoallergenic: bool,
}

impl From<Breed> for BreedResponse {
    fn from(breed: Breed) -> Self {
        Self {
            id: breed.id.into_inner(),
            name: breed.name,
            description: breed.description,
            hypoallergenic: breed.hypoallergenic,
        }
    }
}

pub async fn address_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let postal_code = PostalCode::parse(&path.into_inner())?;
    let resolved = state
        .customers()
        .resolve_address(&postal_code)
        .await
        .map_err(|err| match err {
            ServiceError::Lookup(err) => ApiError::from_lookup(err),
            other => ApiError::from(other),
        })?;
    Ok(HttpResponse::Ok().json(AddressResponse::from(resolved.address)))
}

pub async fn breed_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = BreedId::parse(&path.into_inner())?;
    let breed = state
        .breeds()
        .breed(&id)
        .await
        .map_err(ApiError::from_lookup)?;
    Ok(HttpResponse::Ok().json(BreedResponse::from(breed)))
}
