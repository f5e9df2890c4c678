use std::collections::HashMap;

use petcare_domain::model::{Address, PostalCode};
use petcare_domain::storage::{StorageError, StorageResult};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::addresses;

pub(crate) async fn find_address<C>(
    conn: &C,
    postal_code: &PostalCode,
) -> StorageResult<Option<Address>>
where
    C: ConnectionTrait,
{
    let maybe = addresses::Entity::find_by_id(postal_code.as_str().to_owned())
        .one(conn)
        .await
        .map_err(StorageError::from_source)?;
    maybe.map(address_to_domain).transpose()
}

pub(crate) async fn save_address<C>(conn: &C, address: &Address) -> StorageResult<()>
where
    C: ConnectionTrait,
{
    let model = addresses::ActiveModel {
        postal_code: Set(address.postal_code.as_str().to_owned()),
        street: Set(address.street.clone()),
        complement: Set(address.complement.clone()),
        neighborhood: Set(address.neighborhood.clone()),
        city: Set(address.city.clone()),
        state: Set(address.state.clone()),
    };
    addresses::Entity::insert(model)
        .exec_without_returning(conn)
        .await
        .map_err(StorageError::from_source)?;
    Ok(())
}

pub(crate) async fn list_addresses<C>(conn: &C) -> StorageResult<Vec<Address>>
where
    C: ConnectionTrait,
{
    addresses::Entity::find()
        .order_by_asc(addresses::Column::PostalCode)
        .all(conn)
        .await
        .map_err(StorageError::from_source)?
        .into_iter()
        .map(address_to_domain)
        .collect()
}

/// Batch load keyed by the stored postal code string.
pub(crate) async fn find_addresses<C>(
    conn: &C,
    postal_codes: Vec<String>,
) -> StorageResult<HashMap<String, Address>>
where
    C: ConnectionTrait,
{
    if postal_codes.is_empty() {
        return Ok(HashMap::new());
    }
    let models = addresses::Entity::find()
        .filter(addresses::Column::PostalCode.is_in(postal_codes))
        .all(conn)
        .await
        .map_err(StorageError::from_source)?;

    let mut found = HashMap::with_capacity(models.len());
    for model in models {
        let key = model.postal_code.clone();
        found.insert(key, address_to_domain(model)?);
    }
    Ok(found)
}

fn address_to_domain(model: addresses::Model) -> StorageResult<Address> {
    let postal_code = PostalCode::parse(&model.postal_code).map_err(StorageError::from_source)?;

    Ok(Address {
        postal_code,
        street: model.street,
        complement: model.complement,
        neighborhood: model.neighborhood,
        city: model.city,
        state: model.state,
    })
}
