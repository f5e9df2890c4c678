use petcare_domain::model::{BreedId, CustomerId, NewPet, Pet, PetId};
use petcare_domain::storage::{StorageError, StorageResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::pets;

pub(crate) async fn insert_pet<C>(conn: &C, owner: CustomerId, pet: NewPet) -> StorageResult<Pet>
where
    C: ConnectionTrait,
{
    let model = pets::ActiveModel {
        name: Set(pet.name),
        species: Set(pet.species),
        breed: Set(pet.breed.into_inner()),
        customer_id: Set(owner.get()),
        ..Default::default()
    };
    let created = model
        .insert(conn)
        .await
        .map_err(StorageError::from_source)?;
    Ok(pet_to_domain(created))
}

pub(crate) async fn find_pet<C>(conn: &C, id: PetId) -> StorageResult<Option<Pet>>
where
    C: ConnectionTrait,
{
    let maybe = pets::Entity::find_by_id(id.get())
        .one(conn)
        .await
        .map_err(StorageError::from_source)?;
    Ok(maybe.map(pet_to_domain))
}

pub(crate) async fn pets_of<C>(conn: &C, owner: CustomerId) -> StorageResult<Vec<Pet>>
where
    C: ConnectionTrait,
{
    let models = pets::Entity::find()
        .filter(pets::Column::CustomerId.eq(owner.get()))
        .order_by_asc(pets::Column::Id)
        .all(conn)
        .await
        .map_err(StorageError::from_source)?;
    Ok(models.into_iter().map(pet_to_domain).collect())
}

pub(crate) async fn list_pets<C>(conn: &C) -> StorageResult<Vec<Pet>>
where
    C: ConnectionTrait,
{
    let models = pets::Entity::find()
        .order_by_asc(pets::Column::Id)
        .all(conn)
        .await
        .map_err(StorageError::from_source)?;
    Ok(models.into_iter().map(pet_to_domain).collect())
}

pub(crate) async fn delete_pets_of<C>(conn: &C, owner: CustomerId) -> StorageResult<u64>
where
    C: ConnectionTrait,
{
    let result = pets::Entity::delete_many()
        .filter(pets::Column::CustomerId.eq(owner.get()))
        .exec(conn)
        .await
        .map_err(StorageError::from_source)?;
    Ok(result.rows_affected)
}

pub(crate) fn pet_to_domain(model: pets::Model) -> Pet {
    Pet {
        id: PetId::new(model.id),
        owner: CustomerId::new(model.customer_id),
        name: model.name,
        species: model.species,
        breed: BreedId::new(model.breed),
    }
}
