mod labels;
mod recipes;
mod users;

pub use labels::*;
pub use recipes::*;
pub use users::*;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::{
    error::{Error, QueryError},
    schema::{
        Label, LabelKind, NewUser, Recipe, RecipeDraft, RecipeFilter, User, UserChanges, Uuid,
    },
    store::Store,
};

const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// [`Store`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(QueryError::from)?;

        Ok(Self::new(pool))
    }

    /// Creates any missing table. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), Error> {
        let mut tr = self
            .pool
            .begin()
            .await
            .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&mut *tr)
                .await
                .map_err(QueryError::from)?;
        }

        tr.commit().await.map_err(QueryError::from)?;
        log::info!("Database schema is up to date");

        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        register_user(user, &self.pool).await
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, Error> {
        get_user_by_id(&self.pool, id).await
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>, Error> {
        get_user(&self.pool, email).await
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, Error> {
        update_user(id, changes, &self.pool).await
    }

    async fn create_label(
        &self,
        kind: LabelKind,
        owner: Uuid,
        name: &str,
    ) -> Result<Label, Error> {
        create_label(kind, owner, name, &self.pool).await
    }

    async fn list_labels(
        &self,
        kind: LabelKind,
        owner: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Label>, Error> {
        list_labels(kind, owner, assigned_only, &self.pool).await
    }

    async fn get_labels(&self, kind: LabelKind, ids: &[Uuid]) -> Result<Vec<Label>, Error> {
        get_labels(kind, ids, &self.pool).await
    }

    async fn create_recipe(&self, owner: Uuid, recipe: &RecipeDraft) -> Result<Recipe, Error> {
        create_recipe(owner, recipe, &self.pool).await
    }

    async fn list_recipes(
        &self,
        owner: Uuid,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, Error> {
        fetch_recipes(owner, filter, &self.pool).await
    }

    async fn get_recipe(&self, owner: Uuid, id: Uuid) -> Result<Option<Recipe>, Error> {
        get_recipe(owner, id, &self.pool).await
    }

    async fn update_recipe(
        &self,
        owner: Uuid,
        id: Uuid,
        recipe: &RecipeDraft,
    ) -> Result<Option<Recipe>, Error> {
        update_recipe(owner, id, recipe, &self.pool).await
    }

    async fn delete_recipe(&self, owner: Uuid, id: Uuid) -> Result<bool, Error> {
        delete_recipe(owner, id, &self.pool).await
    }
}
