use serde::{Deserialize, Serialize};

pub type Uuid = i32;

/// Tags and ingredients share one shape; the kind picks the tables they live in
/// and the recipe field that references them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    Tag,
    Ingredient,
}

impl LabelKind {
    pub fn table(&self) -> &'static str {
        match self {
            LabelKind::Tag => "tags",
            LabelKind::Ingredient => "ingredients",
        }
    }

    pub fn link_table(&self) -> &'static str {
        match self {
            LabelKind::Tag => "recipe_tags",
            LabelKind::Ingredient => "recipe_ingredients",
        }
    }

    pub fn link_column(&self) -> &'static str {
        match self {
            LabelKind::Tag => "tag_id",
            LabelKind::Ingredient => "ingredient_id",
        }
    }

    /// Name of the recipe field, query parameter and route segment.
    pub fn field(&self) -> &'static str {
        self.table()
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub name: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.to_owned(),
            name: user.name.to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    /// Already hashed
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    /// Already hashed
    pub password: Option<String>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    pub name: String,
}

pub type Tag = Label;
pub type Ingredient = Label;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct RecipeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    pub title: String,
    pub ingredients: Vec<Uuid>,
    pub tags: Vec<Uuid>,
    pub time_minutes: i32,
    pub price: f64,
    pub link: String,
}

impl Recipe {
    pub fn from_row(row: RecipeRow, tags: Vec<Uuid>, ingredients: Vec<Uuid>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            ingredients,
            tags,
            time_minutes: row.time_minutes,
            price: row.price,
            link: row.link,
        }
    }

    pub fn labels(&self, kind: LabelKind) -> &[Uuid] {
        match kind {
            LabelKind::Tag => &self.tags,
            LabelKind::Ingredient => &self.ingredients,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: Uuid,
    pub title: String,
    pub ingredients: Vec<Ingredient>,
    pub tags: Vec<Tag>,
    pub time_minutes: i32,
    pub price: f64,
    pub link: String,
}

impl RecipeDetail {
    pub fn new(recipe: Recipe, tags: Vec<Tag>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            ingredients,
            tags,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
        }
    }
}

/// Validated recipe fields, ready to be written. Association ids are sorted
/// and deduplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
    pub title: String,
    pub time_minutes: i32,
    pub price: f64,
    pub link: String,
    pub tags: Vec<Uuid>,
    pub ingredients: Vec<Uuid>,
}

impl RecipeDraft {
    pub fn labels(&self, kind: LabelKind) -> &[Uuid] {
        match kind {
            LabelKind::Tag => &self.tags,
            LabelKind::Ingredient => &self.ingredients,
        }
    }
}

impl From<&Recipe> for RecipeDraft {
    fn from(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.to_owned(),
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link.to_owned(),
            tags: recipe.tags.to_owned(),
            ingredients: recipe.ingredients.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

impl RecipeFilter {
    pub fn labels(&self, kind: LabelKind) -> Option<&[Uuid]> {
        match kind {
            LabelKind::Tag => self.tags.as_deref(),
            LabelKind::Ingredient => self.ingredients.as_deref(),
        }
    }

    /// A recipe matches when, for every filter present, it carries at least
    /// one of the listed labels.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        [LabelKind::Tag, LabelKind::Ingredient]
            .into_iter()
            .all(|kind| match self.labels(kind) {
                Some(ids) => recipe.labels(kind).iter().any(|id| ids.contains(id)),
                None => true,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(tags: Vec<Uuid>, ingredients: Vec<Uuid>) -> Recipe {
        Recipe {
            id: 1,
            user_id: 1,
            title: String::from("Pancakes"),
            ingredients,
            tags,
            time_minutes: 15,
            price: 20.0,
            link: String::new(),
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(RecipeFilter::default().matches(&recipe(vec![], vec![])));
    }

    #[test]
    fn filter_requires_any_listed_label_per_kind() {
        let filter = RecipeFilter {
            tags: Some(vec![1, 2]),
            ingredients: Some(vec![7]),
        };

        assert!(filter.matches(&recipe(vec![2], vec![7, 8])));
        assert!(!filter.matches(&recipe(vec![2], vec![8])));
        assert!(!filter.matches(&recipe(vec![3], vec![7])));
    }

    #[test]
    fn owner_is_not_serialized() {
        let tag = Label {
            id: 4,
            user_id: 9,
            name: String::from("Vegan"),
        };

        assert_eq!(
            serde_json::to_value(&tag).unwrap(),
            serde_json::json!({ "id": 4, "name": "Vegan" })
        );
    }
}
