use async_trait::async_trait;

use super::{
    error::Error,
    schema::{
        Label, LabelKind, NewUser, Recipe, RecipeDraft, RecipeFilter, User, UserChanges, Uuid,
    },
};

/// Durable storage behind the API.
///
/// Every recipe and label query is scoped by its owner; the only unscoped
/// lookups are [`Store::get_labels`] and the user queries, which callers
/// check themselves.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fails with a validation error on `email` if the address is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, Error>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, Error>;

    async fn find_user(&self, email: &str) -> Result<Option<User>, Error>;

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, Error>;

    async fn create_label(&self, kind: LabelKind, owner: Uuid, name: &str)
        -> Result<Label, Error>;

    /// Labels of `owner`, by descending name. With `assigned_only`, only the
    /// ones linked to at least one of the owner's recipes, each listed once.
    async fn list_labels(
        &self,
        kind: LabelKind,
        owner: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Label>, Error>;

    /// Labels with the given ids, whoever owns them. Unknown ids are skipped.
    async fn get_labels(&self, kind: LabelKind, ids: &[Uuid]) -> Result<Vec<Label>, Error>;

    async fn create_recipe(&self, owner: Uuid, recipe: &RecipeDraft) -> Result<Recipe, Error>;

    /// Recipes of `owner`, newest first.
    async fn list_recipes(&self, owner: Uuid, filter: &RecipeFilter)
        -> Result<Vec<Recipe>, Error>;

    async fn get_recipe(&self, owner: Uuid, id: Uuid) -> Result<Option<Recipe>, Error>;

    /// Replaces every field and both association sets. `None` when `owner`
    /// has no such recipe.
    async fn update_recipe(
        &self,
        owner: Uuid,
        id: Uuid,
        recipe: &RecipeDraft,
    ) -> Result<Option<Recipe>, Error>;

    /// `false` when `owner` has no such recipe.
    async fn delete_recipe(&self, owner: Uuid, id: Uuid) -> Result<bool, Error>;
}
