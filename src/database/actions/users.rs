use crate::{
    error::{Error, QueryError},
    schema::{NewUser, User, UserChanges, Uuid},
};

use sqlx::{Pool, Postgres};

pub async fn get_user(pool: &Pool<Postgres>, email: &str) -> Result<Option<User>, Error> {
    let row: Option<User> =
        sqlx::query_as("SELECT id, email, name, password FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&*pool)
            .await
            .map_err(QueryError::from)?;

    Ok(row)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, user_id: Uuid) -> Result<Option<User>, Error> {
    let row: Option<User> =
        sqlx::query_as("SELECT id, email, name, password FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&*pool)
            .await
            .map_err(QueryError::from)?;

    Ok(row)
}

/// Creates a user with email and password, which is the hashed version of their password
pub async fn register_user(user: NewUser, pool: &Pool<Postgres>) -> Result<User, Error> {
    let row: Option<User> = sqlx::query_as(
        "
        INSERT INTO users (email, name, password)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO NOTHING
        RETURNING id, email, name, password;
    ",
    )
    .bind(user.email)
    .bind(user.name)
    .bind(user.password)
    .fetch_optional(&*pool)
    .await
    .map_err(QueryError::from)?;

    row.ok_or_else(|| Error::validation("email", "user with this email already exists."))
}

pub async fn update_user(
    user_id: Uuid,
    changes: UserChanges,
    pool: &Pool<Postgres>,
) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as(
        "
        UPDATE users SET
        name = COALESCE($2, name),
        password = COALESCE($3, password)
        WHERE id = $1
        RETURNING id, email, name, password
    ",
    )
    .bind(user_id)
    .bind(changes.name)
    .bind(changes.password)
    .fetch_optional(&*pool)
    .await
    .map_err(QueryError::from)?;

    Ok(row)
}
