use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Address, Customer, CustomerId, NewPet, Pet, PetId, PostalCode};

/// Common result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
}

impl StorageError {
    pub fn from_source(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}

/// Postal code to address mapping. Rows are append-only.
#[async_trait]
pub trait AddressStore: Send + Sync {
    async fn find_address(&self, postal_code: &PostalCode) -> StorageResult<Option<Address>>;
    /// Fails when the postal code is already stored.
    async fn save_address(&self, address: &Address) -> StorageResult<()>;
    async fn list_addresses(&self) -> StorageResult<Vec<Address>>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn insert_customer(
        &self,
        name: &str,
        postal_code: &PostalCode,
    ) -> StorageResult<CustomerId>;
    /// Returns `false` when no row has the given id.
    async fn update_customer(
        &self,
        id: CustomerId,
        name: &str,
        postal_code: &PostalCode,
    ) -> StorageResult<bool>;
    /// Loads the customer together with its address and pets.
    async fn find_customer(&self, id: CustomerId) -> StorageResult<Option<Customer>>;
    async fn customer_exists(&self, id: CustomerId) -> StorageResult<bool>;
    /// Removes the customer and every pet it owns. Returns `false` when
    /// nothing was deleted.
    async fn delete_customer(&self, id: CustomerId) -> StorageResult<bool>;
    async fn list_customers(&self) -> StorageResult<Vec<Customer>>;
}

#[async_trait]
pub trait PetStore: Send + Sync {
    async fn insert_pet(&self, owner: CustomerId, pet: NewPet) -> StorageResult<Pet>;
    async fn find_pet(&self, id: PetId) -> StorageResult<Option<Pet>>;
    /// Pets owned by `owner`, in insertion order.
    async fn pets_of(&self, owner: CustomerId) -> StorageResult<Vec<Pet>>;
    async fn list_pets(&self) -> StorageResult<Vec<Pet>>;
}

/// Every store of the customer aggregate behind one handle.
pub trait Repository: AddressStore + CustomerStore + PetStore {}

/// Write scope spanning all stores. Dropping it without calling
/// [`UnitOfWork::commit`] discards every write made through it.
#[async_trait]
pub trait UnitOfWork: Repository {
    async fn commit(self: Box<Self>) -> StorageResult<()>;
}

#[async_trait]
pub trait TransactionalStore: Repository {
    async fn begin(&self) -> StorageResult<Box<dyn UnitOfWork>>;
}
