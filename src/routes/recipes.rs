use std::sync::Arc;

use warp::{http::StatusCode, Filter, Rejection, Reply};

use crate::{
    error::Error,
    form::Form,
    jwt::{SessionData, SessionKeys},
    middleware::with_session,
    schema::{LabelKind, RecipeDetail, RecipeDraft, RecipeFilter, Uuid},
    store::Store,
};

use super::{form_body, query_ids, with_store, Query};

pub fn routes(
    store: Arc<dyn Store>,
    keys: Arc<SessionKeys>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let list = warp::path!("recipes")
        .and(warp::get())
        .and(with_session(keys.clone()))
        .and(warp::query::<Query>())
        .and(with_store(store.clone()))
        .and_then(list_recipes);

    let create = warp::path!("recipes")
        .and(warp::post())
        .and(with_session(keys.clone()))
        .and(form_body())
        .and(with_store(store.clone()))
        .and_then(create_recipe);

    let detail = warp::path!("recipes" / Uuid)
        .and(warp::get())
        .and(with_session(keys.clone()))
        .and(with_store(store.clone()))
        .and_then(recipe_detail);

    let replace = warp::path!("recipes" / Uuid)
        .and(warp::put().map(|| false).or(warp::patch().map(|| true)).unify())
        .and(with_session(keys.clone()))
        .and(form_body())
        .and(with_store(store.clone()))
        .and_then(update_recipe);

    let delete = warp::path!("recipes" / Uuid)
        .and(warp::delete())
        .and(with_session(keys))
        .and(with_store(store))
        .and_then(delete_recipe);

    list.or(create).or(detail).or(replace).or(delete)
}

/// Checks that every tag and ingredient of the draft belongs to the caller.
async fn authorize_draft(
    session: &SessionData,
    draft: &RecipeDraft,
    store: &dyn Store,
) -> Result<(), Error> {
    for kind in [LabelKind::Tag, LabelKind::Ingredient] {
        session
            .authorize_labels(kind, draft.labels(kind), store)
            .await?;
    }
    Ok(())
}

async fn list_recipes(
    session: SessionData,
    query: Query,
    store: Arc<dyn Store>,
) -> Result<impl Reply, Rejection> {
    let filter = RecipeFilter {
        tags: query_ids(&query, LabelKind::Tag.field())?,
        ingredients: query_ids(&query, LabelKind::Ingredient.field())?,
    };

    let recipes = store.list_recipes(session.user_id, &filter).await?;

    Ok(warp::reply::json(&recipes))
}

async fn create_recipe(
    session: SessionData,
    form: Form,
    store: Arc<dyn Store>,
) -> Result<impl Reply, Rejection> {
    let draft = RecipeDraft::from_form(&form)?;
    authorize_draft(&session, &draft, store.as_ref()).await?;

    let recipe = store.create_recipe(session.user_id, &draft).await?;
    log::debug!("Created recipe {} for user {}", recipe.id, session.user_id);

    Ok(warp::reply::with_status(
        warp::reply::json(&recipe),
        StatusCode::CREATED,
    ))
}

async fn recipe_detail(
    id: Uuid,
    session: SessionData,
    store: Arc<dyn Store>,
) -> Result<impl Reply, Rejection> {
    let recipe = store
        .get_recipe(session.user_id, id)
        .await?
        .ok_or(Error::NotFound)?;

    let tags = store.get_labels(LabelKind::Tag, &recipe.tags).await?;
    let ingredients = store
        .get_labels(LabelKind::Ingredient, &recipe.ingredients)
        .await?;

    Ok(warp::reply::json(&RecipeDetail::new(recipe, tags, ingredients)))
}

async fn update_recipe(
    id: Uuid,
    partial: bool,
    session: SessionData,
    form: Form,
    store: Arc<dyn Store>,
) -> Result<impl Reply, Rejection> {
    let recipe = store
        .get_recipe(session.user_id, id)
        .await?
        .ok_or(Error::NotFound)?;

    let draft = RecipeDraft::update(&recipe, &form, partial)?;
    authorize_draft(&session, &draft, store.as_ref()).await?;

    let recipe = store
        .update_recipe(session.user_id, id, &draft)
        .await?
        .ok_or(Error::NotFound)?;

    Ok(warp::reply::json(&recipe))
}

async fn delete_recipe(
    id: Uuid,
    session: SessionData,
    store: Arc<dyn Store>,
) -> Result<impl Reply, Rejection> {
    if !store.delete_recipe(session.user_id, id).await? {
        return Err(Error::NotFound.into());
    }
    log::debug!("Deleted recipe {id} of user {}", session.user_id);

    Ok(warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT))
}
