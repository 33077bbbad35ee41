use std::sync::Arc;

use serde_json::json;
use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::{
    cryptography::{hash_password_blocking, verify_password_blocking},
    error::Error,
    form::Form,
    jwt::{SessionData, SessionKeys},
    middleware::with_session,
    payload::{Credentials, ProfileUpdate, Registration},
    schema::{NewUser, UserChanges, UserProfile},
    store::Store,
};

use super::{form_body, with_keys, with_store};

pub fn routes(
    store: Arc<dyn Store>,
    keys: Arc<SessionKeys>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let create = warp::path!("user" / "create")
        .and(warp::post())
        .and(form_body())
        .and(with_store(store.clone()))
        .and_then(create_user);

    let token = warp::path!("user" / "token")
        .and(warp::post())
        .and(form_body())
        .and(with_store(store.clone()))
        .and(with_keys(keys.clone()))
        .and_then(create_token);

    let me = warp::path!("user" / "me")
        .and(warp::get())
        .and(with_session(keys.clone()))
        .and(with_store(store.clone()))
        .and_then(get_profile);

    let update = warp::path!("user" / "me")
        .and(warp::put().map(|| false).or(warp::patch().map(|| true)).unify())
        .and(with_session(keys))
        .and(form_body())
        .and(with_store(store))
        .and_then(update_profile);

    create.or(token).or(me).or(update)
}

async fn create_user(form: Form, store: Arc<dyn Store>) -> Result<impl Reply, Rejection> {
    let registration = Registration::from_form(&form)?;

    if store.find_user(&registration.email).await?.is_some() {
        return Err(Error::validation("email", "user with this email already exists.").into());
    }

    let password = hash_password_blocking(registration.password).await?;
    let user = store
        .create_user(NewUser {
            email: registration.email,
            name: registration.name,
            password,
        })
        .await?;
    log::info!("Registered user {}", user.id);

    Ok(warp::reply::with_status(
        warp::reply::json(&UserProfile::from(&user)),
        StatusCode::CREATED,
    ))
}

async fn create_token(
    form: Form,
    store: Arc<dyn Store>,
    keys: Arc<SessionKeys>,
) -> Result<impl Reply, Rejection> {
    let invalid = || {
        Error::validation(
            "non_field_errors",
            "Unable to authenticate with provided credentials",
        )
    };
    let credentials = Credentials::from_form(&form)?;

    let user = store
        .find_user(&credentials.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password_blocking(credentials.password, user.password.to_owned()).await? {
        return Err(invalid().into());
    }

    let token = keys.generate_jwt_session(&user)?;

    Ok(warp::reply::json(&json!({ "token": token })))
}

async fn get_profile(session: SessionData, store: Arc<dyn Store>) -> Result<impl Reply, Rejection> {
    let user = store
        .get_user(session.user_id)
        .await?
        .ok_or_else(|| Error::InvalidSession("User no longer exists".to_owned()))?;

    Ok(warp::reply::json(&UserProfile::from(&user)))
}

async fn update_profile(
    partial: bool,
    session: SessionData,
    form: Form,
    store: Arc<dyn Store>,
) -> Result<impl Reply, Rejection> {
    let update = ProfileUpdate::from_form(&form, partial)?;

    let password = match update.password {
        Some(password) => Some(hash_password_blocking(password).await?),
        None => None,
    };

    let user = store
        .update_user(
            session.user_id,
            UserChanges {
                name: update.name,
                password,
            },
        )
        .await?
        .ok_or_else(|| Error::InvalidSession("User no longer exists".to_owned()))?;

    Ok(warp::reply::json(&UserProfile::from(&user)))
}
