//! SeaORM-backed storage adapters that satisfy the domain storage traits while
//! keeping the database backend swappable (SQLite by default, PostgreSQL via
//! feature flag).

mod address_store;
mod builder;
mod customer_store;
mod entity;
mod migration;
mod pet_store;
mod repository;
mod unit_of_work;

use std::sync::Arc;

use async_trait::async_trait;
use petcare_domain::storage::{StorageError, StorageResult, TransactionalStore, UnitOfWork};
use sea_orm::{Database, DatabaseConnection, TransactionTrait};

pub use builder::StorageBuilder;
use migration::run_migrations;
pub use unit_of_work::SeaOrmUnitOfWork;

/// Shared storage handle used by the HTTP API.
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmStorage {
    /// Connects to the provided database URL and ensures the schema is present.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let db = Database::connect(database_url)
            .await
            .map_err(StorageError::from_source)?;
        run_migrations(&db).await?;
        Ok(Self { db: Arc::new(db) })
    }

    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    pub(crate) fn from_connection(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        self.db.as_ref()
    }
}

#[async_trait]
impl TransactionalStore for SeaOrmStorage {
    async fn begin(&self) -> StorageResult<Box<dyn UnitOfWork>> {
        let tx = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;
        tracing::trace!("opened unit of work");
        Ok(Box::new(SeaOrmUnitOfWork::new(tx)))
    }
}
