use actix_web::{web, HttpResponse};
use petcare_domain::model::{BreedId, CustomerId};

use crate::state::AppState;

use super::{customers::PetResponse, ApiError};

pub async fn list_pets_handler(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let pets = state
        .customers()
        .list_pets(CustomerId::new(path.into_inner()))
        .await?;
    let body: Vec<PetResponse> = pets.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Adds a placeholder dog of the given breed. The breed id is stored as
/// given; `GET /breeds/{breed_id}` is the way to check it beforehand.
pub async fn attach_pet_handler(
    state: web::Data<AppState>,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse, ApiError> {
    let (id, breed) = path.into_inner();
    let breed = BreedId::parse(&breed)?;
    let pet = state
        .customers()
        .attach_pet(CustomerId::new(id), breed)
        .await?;
    Ok(HttpResponse::Created().json(PetResponse::from(pet)))
}
