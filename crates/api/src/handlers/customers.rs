use actix_web::{web, HttpResponse};
use petcare_domain::model::{
    Address, BreedId, Customer, CustomerChanges, CustomerId, NewCustomer, NewPet, Pet, PostalCode,
    DEFAULT_SPECIES,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Deserialize, Serialize)]
pub struct AddressRequest {
    pub postal_code: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PetRequest {
    pub name: String,
    #[serde(default)]
    pub species: Option<String>,
    pub breed: String,
}

/// Body of `POST /customers` and `PUT /customers/{id}`. Any `id` or address
/// field other than the postal code is ignored; on update so is `pets`.
#[derive(Debug, Deserialize, Serialize)]
pub struct CustomerRequest {
    pub name: String,
    pub address: AddressRequest,
    #[serde(default)]
    pub pets: Vec<PetRequest>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressResponse {
    pub postal_code: String,
    pub street: String,
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PetResponse {
    pub id: i64,
    pub name: String,
    pub species: String,
    pub breed: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerResponse {
    pub id: i64,
    pub name: String,
    pub address: AddressResponse,
    pub pets: Vec<PetResponse>,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            postal_code: address.postal_code.into_inner(),
            street: address.street,
            complement: address.complement,
            neighborhood: address.neighborhood,
            city: address.city,
            state: address.state,
        }
    }
}

impl From<Pet> for PetResponse {
    fn from(pet: Pet) -> Self {
        Self {
            id: pet.id.get(),
            name: pet.name,
            species: pet.species,
            breed: pet.breed.into_inner(),
        }
    }
}

impl From<Customer> for CustomerResponse {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.get(),
            name: customer.name,
            address: customer.address.into(),
            pets: customer.pets.into_iter().map(PetResponse::from).collect(),
        }
    }
}

impl CustomerRequest {
    fn into_new_customer(self) -> Result<NewCustomer, ApiError> {
        let postal_code = PostalCode::parse(&self.address.postal_code)?;
        let pets = self
            .pets
            .into_iter()
            .map(|pet| {
                Ok(NewPet {
                    name: pet.name,
                    species: pet.species.unwrap_or_else(|| DEFAULT_SPECIES.to_string()),
                    breed: BreedId::parse(&pet.breed)?,
                })
            })
            .collect::<Result<Vec<_>, ApiError>>()?;

        Ok(NewCustomer {
            name: self.name,
            postal_code,
            pets,
        })
    }

    fn into_changes(self) -> Result<CustomerChanges, ApiError> {
        Ok(CustomerChanges {
            name: self.name,
            postal_code: PostalCode::parse(&self.address.postal_code)?,
        })
    }
}

pub async fn list_customers_handler(
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let customers = state.customers().list_all().await?;
    let body: Vec<CustomerResponse> = customers.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

pub async fn get_customer_handler(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let customer = state
        .customers()
        .get_by_id(CustomerId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

pub async fn create_customer_handler(
    state: web::Data<AppState>,
    payload: web::Json<CustomerRequest>,
) -> Result<HttpResponse, ApiError> {
    let candidate = payload.into_inner().into_new_customer()?;
    let customer = state.customers().insert(candidate).await?;
    Ok(HttpResponse::Created().json(CustomerResponse::from(customer)))
}

pub async fn update_customer_handler(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<CustomerRequest>,
) -> Result<HttpResponse, ApiError> {
    let changes = payload.into_inner().into_changes()?;
    let customer = state
        .customers()
        .update(CustomerId::new(path.into_inner()), changes)
        .await?;
    Ok(HttpResponse::Ok().json(CustomerResponse::from(customer)))
}

pub async fn delete_customer_handler(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    state
        .customers()
        .delete(CustomerId::new(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
