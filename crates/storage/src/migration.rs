use sea_orm::sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement, Table,
    TableCreateStatement,
};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection};

use crate::entity::{addresses, customers, pets};
use petcare_domain::storage::{StorageError, StorageResult};

pub async fn run_migrations(db: &DatabaseConnection) -> StorageResult<()> {
    let backend = db.get_database_backend();

    let addresses_table = Table::create()
        .if_not_exists()
        .table(addresses::Entity)
        .col(
            ColumnDef::new(addresses::Column::PostalCode)
                .string_len(9)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(addresses::Column::Street).string().not_null())
        .col(
            ColumnDef::new(addresses::Column::Complement)
                .string()
                .not_null()
                .default(""),
        )
        .col(
            ColumnDef::new(addresses::Column::Neighborhood)
                .string()
                .not_null(),
        )
        .col(ColumnDef::new(addresses::Column::City).string().not_null())
        .col(
            ColumnDef::new(addresses::Column::State)
                .string_len(2)
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, addresses_table).await?;

    let customers_table = Table::create()
        .if_not_exists()
        .table(customers::Entity)
        .col(
            ColumnDef::new(customers::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(customers::Column::Name).string().not_null())
        .col(
            ColumnDef::new(customers::Column::PostalCode)
                .string_len(9)
                .not_null(),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_customers_address")
                .from(customers::Entity, customers::Column::PostalCode)
                .to(addresses::Entity, addresses::Column::PostalCode),
        )
        .to_owned();
    create_table(db, backend, customers_table).await?;

    let pets_table = Table::create()
        .if_not_exists()
        .table(pets::Entity)
        .col(
            ColumnDef::new(pets::Column::Id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(pets::Column::Name).string().not_null())
        .col(ColumnDef::new(pets::Column::Species).string().not_null())
        .col(ColumnDef::new(pets::Column::Breed).string().not_null())
        .col(
            ColumnDef::new(pets::Column::CustomerId)
                .big_integer()
                .not_null(),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_pets_customer")
                .from(pets::Entity, pets::Column::CustomerId)
                .to(customers::Entity, customers::Column::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned();
    create_table(db, backend, pets_table).await?;

    let pets_by_owner = Index::create()
        .if_not_exists()
        .name("idx_pets_customer_id")
        .table(pets::Entity)
        .col(pets::Column::CustomerId)
        .to_owned();
    create_index(db, backend, pets_by_owner).await?;

    Ok(())
}

async fn create_table(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    mut statement: TableCreateStatement,
) -> StorageResult<()> {
    statement.if_not_exists();
    db.execute(backend.build(&statement))
        .await
        .map_err(StorageError::from_source)?;
    Ok(())
}

async fn create_index(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    statement: IndexCreateStatement,
) -> StorageResult<()> {
    db.execute(backend.build(&statement))
        .await
        .map_err(StorageError::from_source)?;
    Ok(())
}
