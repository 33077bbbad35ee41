use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    error::Error,
    schema::{
        Label, LabelKind, NewUser, Recipe, RecipeDraft, RecipeFilter, User, UserChanges, Uuid,
    },
    store::Store,
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<Uuid, User>,
    tags: BTreeMap<Uuid, Label>,
    ingredients: BTreeMap<Uuid, Label>,
    recipes: BTreeMap<Uuid, Recipe>,
    sequence: Uuid,
}

impl Tables {
    // One sequence for every table, ids are never reused
    fn next_id(&mut self) -> Uuid {
        self.sequence += 1;
        self.sequence
    }

    fn labels(&self, kind: LabelKind) -> &BTreeMap<Uuid, Label> {
        match kind {
            LabelKind::Tag => &self.tags,
            LabelKind::Ingredient => &self.ingredients,
        }
    }

    fn labels_mut(&mut self, kind: LabelKind) -> &mut BTreeMap<Uuid, Label> {
        match kind {
            LabelKind::Tag => &mut self.tags,
            LabelKind::Ingredient => &mut self.ingredients,
        }
    }

    fn owned_recipe_mut(&mut self, owner: Uuid, id: Uuid) -> Option<&mut Recipe> {
        self.recipes
            .get_mut(&id)
            .filter(|recipe| recipe.user_id == owner)
    }
}

/// Store kept in process memory. Used by the test-suite and when the server
/// runs without a database.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(Error::validation(
                "email",
                "user with this email already exists.",
            ));
        }

        let user = User {
            id: tables.next_id(),
            email: user.email,
            name: user.name,
            password: user.password,
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, Error> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>, Error> {
        let tables = self.tables.read().await;

        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, Error> {
        let mut tables = self.tables.write().await;

        Ok(tables.users.get_mut(&id).map(|user| {
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(password) = changes.password {
                user.password = password;
            }
            user.clone()
        }))
    }

    async fn create_label(
        &self,
        kind: LabelKind,
        owner: Uuid,
        name: &str,
    ) -> Result<Label, Error> {
        let mut tables = self.tables.write().await;

        let label = Label {
            id: tables.next_id(),
            user_id: owner,
            name: name.to_owned(),
        };
        tables.labels_mut(kind).insert(label.id, label.clone());

        Ok(label)
    }

    async fn list_labels(
        &self,
        kind: LabelKind,
        owner: Uuid,
        assigned_only: bool,
    ) -> Result<Vec<Label>, Error> {
        let tables = self.tables.read().await;

        let assigned: BTreeSet<Uuid> = tables
            .recipes
            .values()
            .filter(|recipe| recipe.user_id == owner)
            .flat_map(|recipe| recipe.labels(kind).iter().copied())
            .collect();

        let mut labels: Vec<Label> = tables
            .labels(kind)
            .values()
            .filter(|label| label.user_id == owner)
            .filter(|label| !assigned_only || assigned.contains(&label.id))
            .cloned()
            .collect();
        labels.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));

        Ok(labels)
    }

    async fn get_labels(&self, kind: LabelKind, ids: &[Uuid]) -> Result<Vec<Label>, Error> {
        let tables = self.tables.read().await;
        let labels = tables.labels(kind);

        Ok(ids.iter().filter_map(|id| labels.get(id).cloned()).collect())
    }

    async fn create_recipe(&self, owner: Uuid, recipe: &RecipeDraft) -> Result<Recipe, Error> {
        let mut tables = self.tables.write().await;

        let recipe = Recipe {
            id: tables.next_id(),
            user_id: owner,
            title: recipe.title.to_owned(),
            ingredients: recipe.ingredients.to_owned(),
            tags: recipe.tags.to_owned(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.to_owned(),
        };
        tables.recipes.insert(recipe.id, recipe.clone());

        Ok(recipe)
    }

    async fn list_recipes(
        &self,
        owner: Uuid,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, Error> {
        let tables = self.tables.read().await;

        Ok(tables
            .recipes
            .values()
            .rev()
            .filter(|recipe| recipe.user_id == owner && filter.matches(recipe))
            .cloned()
            .collect())
    }

    async fn get_recipe(&self, owner: Uuid, id: Uuid) -> Result<Option<Recipe>, Error> {
        let tables = self.tables.read().await;

        Ok(tables
            .recipes
            .get(&id)
            .filter(|recipe| recipe.user_id == owner)
            .cloned())
    }

    async fn update_recipe(
        &self,
        owner: Uuid,
        id: Uuid,
        draft: &RecipeDraft,
    ) -> Result<Option<Recipe>, Error> {
        let mut tables = self.tables.write().await;

        Ok(tables.owned_recipe_mut(owner, id).map(|recipe| {
            recipe.title = draft.title.to_owned();
            recipe.time_minutes = draft.time_minutes;
            recipe.price = draft.price;
            recipe.link = draft.link.to_owned();
            recipe.tags = draft.tags.to_owned();
            recipe.ingredients = draft.ingredients.to_owned();
            recipe.clone()
        }))
    }

    async fn delete_recipe(&self, owner: Uuid, id: Uuid) -> Result<bool, Error> {
        let mut tables = self.tables.write().await;

        if tables.owned_recipe_mut(owner, id).is_none() {
            return Ok(false);
        }

        Ok(tables.recipes.remove(&id).is_some())
    }
}
