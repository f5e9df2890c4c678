//! Customer aggregate workflow: address resolution through a read-through
//! cache, customer persistence and pet association, each mutating operation
//! wrapped in a single unit of work.

use std::sync::Arc;

use metrics::counter;
use strum_macros::IntoStaticStr;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::lookup::{AddressLookup, LookupError};
use crate::model::{
    Address, BreedId, Customer, CustomerChanges, CustomerId, NewCustomer, NewPet, Pet, PostalCode,
};
use crate::services::cache::AddressMemo;
use crate::storage::{AddressStore, StorageError, TransactionalStore};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("customer {0} not found")]
    NotFound(CustomerId),
    #[error("address lookup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// Where a resolved address came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionSource {
    Memory,
    Store,
    Lookup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress {
    pub address: Address,
    pub source: ResolutionSource,
}

pub struct CustomerService<S> {
    store: S,
    addresses: Arc<dyn AddressLookup>,
    memo: AddressMemo,
}

impl<S> CustomerService<S>
where
    S: TransactionalStore,
{
    pub fn new(store: S, addresses: Arc<dyn AddressLookup>, memo: AddressMemo) -> Self {
        Self {
            store,
            addresses,
            memo,
        }
    }

    pub async fn list_all(&self) -> ServiceResult<Vec<Customer>> {
        Ok(self.store.list_customers().await?)
    }

    pub async fn get_by_id(&self, id: CustomerId) -> ServiceResult<Customer> {
        self.store
            .find_customer(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Resolves the address, stores the customer and every candidate pet as
    /// one atomic write.
    pub async fn insert(&self, candidate: NewCustomer) -> ServiceResult<Customer> {
        let NewCustomer {
            name,
            postal_code,
            pets: candidates,
        } = candidate;

        let uow = self.store.begin().await?;
        let resolved = self.resolve_in(&*uow, &postal_code).await?;
        let id = uow
            .insert_customer(&name, &resolved.address.postal_code)
            .await?;

        let mut pets = Vec::with_capacity(candidates.len());
        for pet in candidates {
            pets.push(uow.insert_pet(id, pet).await?);
        }
        uow.commit().await?;
        self.memo.remember(&resolved.address);

        record_operation("insert", "ok");
        info!(customer_id = %id, pets = pets.len(), "customer created");
        Ok(Customer {
            id,
            name,
            address: resolved.address,
            pets,
        })
    }

    /// Rewrites name and address of an existing customer. The id always comes
    /// from the caller; the pet list is left untouched.
    pub async fn update(&self, id: CustomerId, changes: CustomerChanges) -> ServiceResult<Customer> {
        self.ensure_exists(id, "update").await?;

        let uow = self.store.begin().await?;
        let resolved = self.resolve_in(&*uow, &changes.postal_code).await?;
        if !uow
            .update_customer(id, &changes.name, &resolved.address.postal_code)
            .await?
        {
            record_operation("update", "not_found");
            return Err(ServiceError::NotFound(id));
        }
        uow.commit().await?;
        self.memo.remember(&resolved.address);

        record_operation("update", "ok");
        info!(customer_id = %id, "customer updated");
        self.get_by_id(id).await
    }

    /// Deletes the customer together with the pets it owns.
    pub async fn delete(&self, id: CustomerId) -> ServiceResult<()> {
        self.ensure_exists(id, "delete").await?;

        let uow = self.store.begin().await?;
        if !uow.delete_customer(id).await? {
            record_operation("delete", "not_found");
            return Err(ServiceError::NotFound(id));
        }
        uow.commit().await?;

        record_operation("delete", "ok");
        info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    pub async fn list_pets(&self, id: CustomerId) -> ServiceResult<Vec<Pet>> {
        self.ensure_exists(id, "list_pets").await?;
        Ok(self.store.pets_of(id).await?)
    }

    /// Adds a placeholder dog of the given breed. The breed id is stored
    /// verbatim and is not checked against the breed service.
    pub async fn attach_pet(&self, id: CustomerId, breed: BreedId) -> ServiceResult<Pet> {
        self.ensure_exists(id, "attach_pet").await?;

        let uow = self.store.begin().await?;
        let pet = uow.insert_pet(id, NewPet::placeholder(breed)).await?;
        uow.commit().await?;

        record_operation("attach_pet", "ok");
        info!(customer_id = %id, pet_id = %pet.id, breed = %pet.breed, "pet attached");
        Ok(pet)
    }

    /// Read-through resolution on its own, committed in a dedicated unit of
    /// work.
    pub async fn resolve_address(&self, postal_code: &PostalCode) -> ServiceResult<ResolvedAddress> {
        if let Some(address) = self.memo.get(postal_code) {
            record_resolution(ResolutionSource::Memory);
            return Ok(ResolvedAddress {
                address,
                source: ResolutionSource::Memory,
            });
        }

        let uow = self.store.begin().await?;
        let resolved = self.resolve_in(&*uow, postal_code).await?;
        uow.commit().await?;
        self.memo.remember(&resolved.address);
        Ok(resolved)
    }

    /// Memo, then store, then the external lookup. A lookup hit is written to
    /// `store` under the requested postal code; the memo is only filled by
    /// callers once their write scope commits.
    async fn resolve_in<R>(&self, store: &R, postal_code: &PostalCode) -> ServiceResult<ResolvedAddress>
    where
        R: AddressStore + ?Sized,
    {
        let resolved = if let Some(address) = self.memo.get(postal_code) {
            ResolvedAddress {
                address,
                source: ResolutionSource::Memory,
            }
        } else if let Some(address) = store.find_address(postal_code).await? {
            ResolvedAddress {
                address,
                source: ResolutionSource::Store,
            }
        } else {
            let mut address = self
                .addresses
                .resolve(postal_code)
                .await
                .inspect_err(|err| {
                    warn!(postal_code = %postal_code, error = %err, "address lookup failed");
                })?;
            address.postal_code = postal_code.clone();
            store.save_address(&address).await?;
            ResolvedAddress {
                address,
                source: ResolutionSource::Lookup,
            }
        };

        record_resolution(resolved.source);
        debug!(postal_code = %postal_code, source = ?resolved.source, "address resolved");
        Ok(resolved)
    }

    async fn ensure_exists(&self, id: CustomerId, operation: &'static str) -> ServiceResult<()> {
        if self.store.customer_exists(id).await? {
            Ok(())
        } else {
            record_operation(operation, "not_found");
            Err(ServiceError::NotFound(id))
        }
    }
}

fn record_resolution(source: ResolutionSource) {
    let label: &'static str = source.into();
    counter!("address_resolutions_total", "source" => label).increment(1);
}

fn record_operation(operation: &'static str, result: &'static str) {
    counter!("customer_operations_total", "operation" => operation, "result" => result)
        .increment(1);
}
