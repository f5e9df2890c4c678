use petcare_domain::storage::{StorageError, StorageResult, UnitOfWork};
use sea_orm::DatabaseTransaction;

/// Write scope backed by a database transaction. SeaORM rolls the
/// transaction back when it is dropped without a commit.
pub struct SeaOrmUnitOfWork {
    tx: DatabaseTransaction,
}

impl SeaOrmUnitOfWork {
    pub(crate) fn new(tx: DatabaseTransaction) -> Self {
        Self { tx }
    }

    pub fn connection(&self) -> &DatabaseTransaction {
        &self.tx
    }
}

#[async_trait::async_trait]
impl UnitOfWork for SeaOrmUnitOfWork {
    async fn commit(self: Box<Self>) -> StorageResult<()> {
        let this = *self;
        this.tx.commit().await.map_err(StorageError::from_source)
    }
}
