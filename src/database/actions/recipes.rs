use std::collections::HashMap;

use crate::{
    error::{Error, QueryError},
    schema::{LabelKind, Recipe, RecipeDraft, RecipeFilter, RecipeRow, Uuid},
};

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

const RECIPE_COLUMNS: &str = "r.id, r.user_id, r.title, r.time_minutes, r.price, r.link";

/// Association ids of every listed recipe, ascending.
pub async fn list_recipe_labels(
    kind: LabelKind,
    recipe_ids: &[Uuid],
    pool: &Pool<Postgres>,
) -> Result<HashMap<Uuid, Vec<Uuid>>, Error> {
    let link_table = kind.link_table();
    let link_column = kind.link_column();

    let links: Vec<(Uuid, Uuid)> = sqlx::query_as(&format!(
        "SELECT recipe_id, {link_column} FROM {link_table} WHERE recipe_id = ANY($1) ORDER BY {link_column}"
    ))
    .bind(recipe_ids)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    let mut hashmap: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    links
        .into_iter()
        .for_each(|(recipe_id, label_id)| match hashmap.get_mut(&recipe_id) {
            Some(v) => v.push(label_id),
            None => {
                hashmap.insert(recipe_id, vec![label_id]);
            }
        });

    Ok(hashmap)
}

async fn with_labels(rows: Vec<RecipeRow>, pool: &Pool<Postgres>) -> Result<Vec<Recipe>, Error> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
    let mut tags = list_recipe_labels(LabelKind::Tag, &ids, pool).await?;
    let mut ingredients = list_recipe_labels(LabelKind::Ingredient, &ids, pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.id;
            Recipe::from_row(
                row,
                tags.remove(&id).unwrap_or_default(),
                ingredients.remove(&id).unwrap_or_default(),
            )
        })
        .collect())
}

pub async fn fetch_recipes(
    user_id: Uuid,
    filter: &RecipeFilter,
    pool: &Pool<Postgres>,
) -> Result<Vec<Recipe>, Error> {
    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.user_id = "));
    query.push_bind(user_id);

    for kind in [LabelKind::Tag, LabelKind::Ingredient] {
        if let Some(ids) = filter.labels(kind) {
            query.push(format!(
                " AND EXISTS (SELECT 1 FROM {} lm WHERE lm.recipe_id = r.id AND lm.{} = ANY(",
                kind.link_table(),
                kind.link_column()
            ));
            query.push_bind(ids.to_vec());
            query.push("))");
        }
    }
    query.push(" ORDER BY r.id DESC");

    let rows: Vec<RecipeRow> = query
        .build_query_as()
        .fetch_all(pool)
        .await
        .map_err(QueryError::from)?;

    with_labels(rows, pool).await
}

pub async fn get_recipe(
    user_id: Uuid,
    id: Uuid,
    pool: &Pool<Postgres>,
) -> Result<Option<Recipe>, Error> {
    let row: Option<RecipeRow> = sqlx::query_as(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes r WHERE r.id = $1 AND r.user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(QueryError::from)?;

    match row {
        Some(row) => Ok(with_labels(vec![row], pool).await?.pop()),
        None => Ok(None),
    }
}

async fn set_recipe_labels(
    kind: LabelKind,
    recipe_id: Uuid,
    ids: &[Uuid],
    conn: &mut PgConnection,
) -> Result<(), Error> {
    let link_table = kind.link_table();
    let link_column = kind.link_column();

    sqlx::query(&format!("DELETE FROM {link_table} WHERE recipe_id = $1"))
        .bind(recipe_id)
        .execute(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    sqlx::query(&format!(
        "INSERT INTO {link_table} (recipe_id, {link_column}) SELECT $1, UNNEST($2::int4[]) ON CONFLICT DO NOTHING"
    ))
    .bind(recipe_id)
    .bind(ids)
    .execute(&mut *conn)
    .await
    .map_err(QueryError::from)?;

    Ok(())
}

pub async fn create_recipe(
    user_id: Uuid,
    recipe: &RecipeDraft,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    let row: RecipeRow = sqlx::query_as(
        "
        INSERT INTO recipes (user_id, title, time_minutes, price, link)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, title, time_minutes, price, link
    ",
    )
    .bind(user_id)
    .bind(&recipe.title)
    .bind(recipe.time_minutes)
    .bind(recipe.price)
    .bind(&recipe.link)
    .fetch_one(&mut *tr)
    .await
    .map_err(QueryError::from)?;

    for kind in [LabelKind::Tag, LabelKind::Ingredient] {
        set_recipe_labels(kind, row.id, recipe.labels(kind), &mut tr).await?;
    }

    tr.commit().await.map_err(QueryError::from)?;

    Ok(Recipe::from_row(
        row,
        recipe.tags.to_owned(),
        recipe.ingredients.to_owned(),
    ))
}

pub async fn update_recipe(
    user_id: Uuid,
    id: Uuid,
    recipe: &RecipeDraft,
    pool: &Pool<Postgres>,
) -> Result<Option<Recipe>, Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    let row: Option<RecipeRow> = sqlx::query_as(
        "
        UPDATE recipes SET title = $3, time_minutes = $4, price = $5, link = $6
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, time_minutes, price, link
    ",
    )
    .bind(id)
    .bind(user_id)
    .bind(&recipe.title)
    .bind(recipe.time_minutes)
    .bind(recipe.price)
    .bind(&recipe.link)
    .fetch_optional(&mut *tr)
    .await
    .map_err(QueryError::from)?;

    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    for kind in [LabelKind::Tag, LabelKind::Ingredient] {
        set_recipe_labels(kind, row.id, recipe.labels(kind), &mut tr).await?;
    }

    tr.commit().await.map_err(QueryError::from)?;

    Ok(Some(Recipe::from_row(
        row,
        recipe.tags.to_owned(),
        recipe.ingredients.to_owned(),
    )))
}

pub async fn delete_recipe(user_id: Uuid, id: Uuid, pool: &Pool<Postgres>) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(result.rows_affected() > 0)
}
