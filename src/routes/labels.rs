use std::sync::Arc;

use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::{
    form::Form,
    jwt::{SessionData, SessionKeys},
    middleware::with_session,
    schema::LabelKind,
    store::Store,
};

use super::{form_body, query_flag, with_store, Query};

/// `GET` and `POST` on `/tags` or `/ingredients`.
pub fn routes(
    kind: LabelKind,
    store: Arc<dyn Store>,
    keys: Arc<SessionKeys>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let base = warp::path(kind.field()).and(warp::path::end());

    let list = base
        .clone()
        .and(warp::get())
        .and(with_session(keys.clone()))
        .and(warp::query::<Query>())
        .and(with_store(store.clone()))
        .and_then(
            move |session: SessionData, query: Query, store: Arc<dyn Store>| {
                list_labels(kind, session, query, store)
            },
        );

    let create = base
        .and(warp::post())
        .and(with_session(keys))
        .and(form_body())
        .and(with_store(store))
        .and_then(
            move |session: SessionData, form: Form, store: Arc<dyn Store>| {
                create_label(kind, session, form, store)
            },
        );

    list.or(create)
}

async fn list_labels(
    kind: LabelKind,
    session: SessionData,
    query: Query,
    store: Arc<dyn Store>,
) -> Result<impl Reply, Rejection> {
    let assigned_only = query_flag(&query, "assigned_only")?;
    let labels = store
        .list_labels(kind, session.user_id, assigned_only)
        .await?;

    Ok(warp::reply::json(&labels))
}

async fn create_label(
    kind: LabelKind,
    session: SessionData,
    form: Form,
    store: Arc<dyn Store>,
) -> Result<impl Reply, Rejection> {
    let name = form.get_name("name")?;

    let label = store.create_label(kind, session.user_id, &name).await?;
    log::debug!(
        "Created {} {} for user {}",
        kind.field(),
        label.id,
        session.user_id
    );

    Ok(warp::reply::with_status(
        warp::reply::json(&label),
        StatusCode::CREATED,
    ))
}
