//! Generic SeaORM repository helper for entities keyed by UUID.
//!
//! Domain crates implement their own `*Repository` traits and hand-written
//! filter/query logic; `BaseRepository` only wraps the handful of CRUD calls
//! every Postgres-backed repository repeats (insert, find-by-id, update,
//! delete-by-id).

use sea_orm::{ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, PrimaryKeyTrait};
use std::marker::PhantomData;
use uuid::Uuid;

/// Marks a SeaORM entity whose primary key is a UUID, so `BaseRepository`
/// can offer `find_by_id`/`delete_by_id` taking a plain `Uuid`.
pub trait UuidEntity: EntityTrait
where
    <Self::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
}

/// Thin wrapper over a `DatabaseConnection` scoped to one entity.
///
/// # Example
/// ```ignore
/// pub struct PgTaskRepository {
///     base: BaseRepository<entity::Entity>,
/// }
///
/// impl PgTaskRepository {
///     pub fn new(db: DatabaseConnection) -> Self {
///         Self { base: BaseRepository::new(db) }
///     }
/// }
/// ```
pub struct BaseRepository<E: EntityTrait> {
    db: DatabaseConnection,
    _entity: PhantomData<E>,
}

impl<E: EntityTrait> BaseRepository<E> {
    /// Wrap an existing connection.
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// Access the underlying connection for queries `BaseRepository` doesn't cover.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Insert an active model and return the persisted row.
    pub async fn insert(&self, model: E::ActiveModel) -> Result<E::Model, DbErr>
    where
        E::ActiveModel: ActiveModelBehavior + Send,
        E::Model: sea_orm::IntoActiveModel<E::ActiveModel>,
    {
        model.insert(&self.db).await
    }

    /// Update an active model and return the persisted row.
    pub async fn update(&self, model: E::ActiveModel) -> Result<E::Model, DbErr>
    where
        E::ActiveModel: ActiveModelBehavior + Send,
        E::Model: sea_orm::IntoActiveModel<E::ActiveModel>,
    {
        model.update(&self.db).await
    }
}

impl<E> BaseRepository<E>
where
    E: UuidEntity,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    /// Fetch a row by its UUID primary key.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<E::Model>, DbErr> {
        E::find_by_id(id).one(&self.db).await
    }

    /// Delete a row by its UUID primary key, returning the number of rows removed.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<u64, DbErr> {
        let result = E::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}
