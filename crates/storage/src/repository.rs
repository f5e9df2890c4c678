//! Store trait implementations shared by the pooled connection and the
//! transactional unit of work. Both expose `connection()` returning a SeaORM
//! `ConnectionTrait` implementor; every method forwards to the query
//! functions in the per-table modules.

use petcare_domain::model::{Address, Customer, CustomerId, NewPet, Pet, PetId, PostalCode};
use petcare_domain::storage::{
    AddressStore, CustomerStore, PetStore, Repository, StorageResult,
};

use crate::{address_store, customer_store, pet_store, SeaOrmStorage, SeaOrmUnitOfWork};

macro_rules! impl_repository {
    ($ty:ty) => {
        #[async_trait::async_trait]
        impl AddressStore for $ty {
            async fn find_address(
                &self,
                postal_code: &PostalCode,
            ) -> StorageResult<Option<Address>> {
                address_store::find_address(self.connection(), postal_code).await
            }

            async fn save_address(&self, address: &Address) -> StorageResult<()> {
                address_store::save_address(self.connection(), address).await
            }

            async fn list_addresses(&self) -> StorageResult<Vec<Address>> {
                address_store::list_addresses(self.connection()).await
            }
        }

        #[async_trait::async_trait]
        impl CustomerStore for $ty {
            async fn insert_customer(
                &self,
                name: &str,
                postal_code: &PostalCode,
            ) -> StorageResult<CustomerId> {
                customer_store::insert_customer(self.connection(), name, postal_code).await
            }

            async fn update_customer(
                &self,
                id: CustomerId,
                name: &str,
                postal_code: &PostalCode,
            ) -> StorageResult<bool> {
                customer_store::update_customer(self.connection(), id, name, postal_code).await
            }

            async fn find_customer(&self, id: CustomerId) -> StorageResult<Option<Customer>> {
                customer_store::find_customer(self.connection(), id).await
            }

            async fn customer_exists(&self, id: CustomerId) -> StorageResult<bool> {
                customer_store::customer_exists(self.connection(), id).await
            }

            async fn delete_customer(&self, id: CustomerId) -> StorageResult<bool> {
                customer_store::delete_customer(self.connection(), id).await
            }

            async fn list_customers(&self) -> StorageResult<Vec<Customer>> {
                customer_store::list_customers(self.connection()).await
            }
        }

        #[async_trait::async_trait]
        impl PetStore for $ty {
            async fn insert_pet(&self, owner: CustomerId, pet: NewPet) -> StorageResult<Pet> {
                pet_store::insert_pet(self.connection(), owner, pet).await
            }

            async fn find_pet(&self, id: PetId) -> StorageResult<Option<Pet>> {
                pet_store::find_pet(self.connection(), id).await
            }

            async fn pets_of(&self, owner: CustomerId) -> StorageResult<Vec<Pet>> {
                pet_store::pets_of(self.connection(), owner).await
            }

            async fn list_pets(&self) -> StorageResult<Vec<Pet>> {
                pet_store::list_pets(self.connection()).await
            }
        }

        impl Repository for $ty {}
    };
}

impl_repository!(SeaOrmStorage);
impl_repository!(SeaOrmUnitOfWork);
