use std::collections::BTreeSet;

use petcare_domain::model::{Address, Customer, CustomerId, Pet, PostalCode};
use petcare_domain::storage::{StorageError, StorageResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::address_store::{find_address, find_addresses};
use crate::entity::{customers, pets};
use crate::pet_store::{delete_pets_of, pet_to_domain, pets_of};

pub(crate) async fn insert_customer<C>(
    conn: &C,
    name: &str,
    postal_code: &PostalCode,
) -> StorageResult<CustomerId>
where
    C: ConnectionTrait,
{
    let model = customers::ActiveModel {
        name: Set(name.to_owned()),
        postal_code: Set(postal_code.as_str().to_owned()),
        ..Default::default()
    };
    let created = model
        .insert(conn)
        .await
        .map_err(StorageError::from_source)?;
    Ok(CustomerId::new(created.id))
}

pub(crate) async fn update_customer<C>(
    conn: &C,
    id: CustomerId,
    name: &str,
    postal_code: &PostalCode,
) -> StorageResult<bool>
where
    C: ConnectionTrait,
{
    let result = customers::Entity::update_many()
        .col_expr(customers::Column::Name, Expr::value(name.to_owned()))
        .col_expr(
            customers::Column::PostalCode,
            Expr::value(postal_code.as_str().to_owned()),
        )
        .filter(customers::Column::Id.eq(id.get()))
        .exec(conn)
        .await
        .map_err(StorageError::from_source)?;
    Ok(result.rows_affected > 0)
}

pub(crate) async fn find_customer<C>(conn: &C, id: CustomerId) -> StorageResult<Option<Customer>>
where
    C: ConnectionTrait,
{
    let Some(model) = customers::Entity::find_by_id(id.get())
        .one(conn)
        .await
        .map_err(StorageError::from_source)?
    else {
        return Ok(None);
    };

    let postal_code = PostalCode::parse(&model.postal_code).map_err(StorageError::from_source)?;
    let address = find_address(conn, &postal_code)
        .await?
        .ok_or_else(|| dangling_address(&model))?;
    let pets = pets_of(conn, id).await?;

    Ok(Some(assemble(model, address, pets)))
}

pub(crate) async fn customer_exists<C>(conn: &C, id: CustomerId) -> StorageResult<bool>
where
    C: ConnectionTrait,
{
    let count = customers::Entity::find()
        .filter(customers::Column::Id.eq(id.get()))
        .count(conn)
        .await
        .map_err(StorageError::from_source)?;
    Ok(count > 0)
}

/// Pets go first so the statement order holds on backends without
/// enforced foreign keys.
pub(crate) async fn delete_customer<C>(conn: &C, id: CustomerId) -> StorageResult<bool>
where
    C: ConnectionTrait,
{
    delete_pets_of(conn, id).await?;
    let result = customers::Entity::delete_by_id(id.get())
        .exec(conn)
        .await
        .map_err(StorageError::from_source)?;
    Ok(result.rows_affected > 0)
}

pub(crate) async fn list_customers<C>(conn: &C) -> StorageResult<Vec<Customer>>
where
    C: ConnectionTrait,
{
    let rows = customers::Entity::find()
        .find_with_related(pets::Entity)
        .order_by_asc(customers::Column::Id)
        .order_by_asc(pets::Column::Id)
        .all(conn)
        .await
        .map_err(StorageError::from_source)?;

    let postal_codes: BTreeSet<String> = rows
        .iter()
        .map(|(customer, _)| customer.postal_code.clone())
        .collect();
    let addresses = find_addresses(conn, postal_codes.into_iter().collect()).await?;

    rows.into_iter()
        .map(|(customer, pets)| {
            let address = addresses
                .get(&customer.postal_code)
                .cloned()
                .ok_or_else(|| dangling_address(&customer))?;
            let pets = pets.into_iter().map(pet_to_domain).collect();
            Ok(assemble(customer, address, pets))
        })
        .collect()
}

fn assemble(model: customers::Model, address: Address, pets: Vec<Pet>) -> Customer {
    Customer {
        id: CustomerId::new(model.id),
        name: model.name,
        address,
        pets,
    }
}

fn dangling_address(model: &customers::Model) -> StorageError {
    StorageError::Database(format!(
        "customer {} references unknown postal code {}",
        model.id, model.postal_code
    ))
}
