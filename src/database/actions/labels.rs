use crate::{
    error::{Error, QueryError},
    schema::{Label, LabelKind, Uuid},
};

use sqlx::{Pool, Postgres};

pub async fn create_label(
    kind: LabelKind,
    user_id: Uuid,
    name: &str,
    pool: &Pool<Postgres>,
) -> Result<Label, Error> {
    let table = kind.table();

    let label: Label = sqlx::query_as(&format!(
        "INSERT INTO {table} (user_id, name) VALUES ($1, $2) RETURNING id, user_id, name"
    ))
    .bind(user_id)
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(label)
}

pub async fn list_labels(
    kind: LabelKind,
    user_id: Uuid,
    assigned_only: bool,
    pool: &Pool<Postgres>,
) -> Result<Vec<Label>, Error> {
    let table = kind.table();
    let link_table = kind.link_table();
    let link_column = kind.link_column();

    let query = match assigned_only {
        true => format!(
            "
            SELECT l.id, l.user_id, l.name
            FROM {table} l
            WHERE l.user_id = $1 AND EXISTS (
                SELECT 1 FROM {link_table} lm
                INNER JOIN recipes r ON r.id = lm.recipe_id
                WHERE lm.{link_column} = l.id AND r.user_id = $1
            )
            ORDER BY l.name COLLATE \"C\" DESC, l.id DESC
        "
        ),
        false => format!(
            "SELECT id, user_id, name FROM {table} WHERE user_id = $1 ORDER BY name COLLATE \"C\" DESC, id DESC"
        ),
    };

    let list: Vec<Label> = sqlx::query_as(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(list)
}

pub async fn get_labels(
    kind: LabelKind,
    ids: &[Uuid],
    pool: &Pool<Postgres>,
) -> Result<Vec<Label>, Error> {
    let table = kind.table();

    let list: Vec<Label> = sqlx::query_as(&format!(
        "SELECT id, user_id, name FROM {table} WHERE id = ANY($1) ORDER BY id"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(list)
}
