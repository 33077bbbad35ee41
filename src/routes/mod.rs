//! HTTP surface of the API, assembled from warp filters.

use std::{collections::HashMap, convert::Infallible, sync::Arc};

use futures::TryStreamExt;
use serde_json::json;
use warp::{
    filters::body::BodyDeserializeError,
    http::{
        header::{HeaderMap, CONTENT_TYPE},
        StatusCode,
    },
    hyper::body::Buf,
    multipart,
    reject::{
        InvalidHeader, InvalidQuery, LengthRequired, MethodNotAllowed, PayloadTooLarge,
        UnsupportedMediaType,
    },
    Filter, Rejection, Reply,
};

use crate::{
    constants::MAX_BODY_BYTES,
    error::Error,
    form::{Form, FormData, NOT_A_STRING},
    jwt::SessionKeys,
    schema::{LabelKind, Uuid},
    store::Store,
};

mod labels;
mod recipes;
mod users;

pub type Query = HashMap<String, String>;

/// Every route of the API, with rejections rendered as JSON.
pub fn api(
    store: Arc<dyn Store>,
    keys: Arc<SessionKeys>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    labels::routes(LabelKind::Tag, store.clone(), keys.clone())
        .or(labels::routes(LabelKind::Ingredient, store.clone(), keys.clone()))
        .or(recipes::routes(store.clone(), keys.clone()))
        .or(users::routes(store, keys))
        .recover(handle_rejection)
        .with(warp::log("recipe_api"))
}

pub fn with_store(
    store: Arc<dyn Store>,
) -> impl Filter<Extract = (Arc<dyn Store>,), Error = Infallible> + Clone {
    warp::any().map(move || store.clone())
}

pub fn with_keys(
    keys: Arc<SessionKeys>,
) -> impl Filter<Extract = (Arc<SessionKeys>,), Error = Infallible> + Clone {
    warp::any().map(move || keys.clone())
}

/// Passes only requests whose `Content-Type` starts with `mime`.
fn content_type(mime: &'static str) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::headers_cloned()
        .and_then(move |headers: HeaderMap| async move {
            let matches = headers
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with(mime));

            match matches {
                true => Ok(()),
                false => Err(warp::reject::not_found()),
            }
        })
        .untuple_one()
}

/// Text fields of a multipart form. Uploaded files are skipped.
async fn multipart_fields(form: multipart::FormData) -> Result<Vec<(String, String)>, Rejection> {
    let invalid = |e: warp::Error| Error::InvalidRequest(format!("Multipart form parse error - {e}"));

    let mut parts = Box::pin(form);
    let mut fields = vec![];
    while let Some(mut part) = parts.try_next().await.map_err(invalid)? {
        if part.filename().is_some() {
            log::debug!("Skipping uploaded file in field {}", part.name());
            continue;
        }

        let mut value = Vec::new();
        while let Some(mut chunk) = part.data().await.transpose().map_err(invalid)? {
            while chunk.has_remaining() {
                let bytes = chunk.chunk();
                value.extend_from_slice(bytes);
                let read = bytes.len();
                chunk.advance(read);
            }
        }

        let value =
            String::from_utf8(value).map_err(|_| Error::validation(part.name(), NOT_A_STRING))?;
        fields.push((part.name().to_owned(), value));
    }

    Ok(fields)
}

/// Request body of at most [`MAX_BODY_BYTES`]: an urlencoded form, a
/// multipart form or a JSON object.
pub fn form_body() -> impl Filter<Extract = (Form,), Error = Rejection> + Clone {
    let urlencoded = content_type("application/x-www-form-urlencoded")
        .and(warp::body::form::<Vec<(String, String)>>())
        .map(Form::from_pairs);

    let multipart = content_type("multipart/form-data")
        .and(multipart::form().max_length(MAX_BODY_BYTES))
        .and_then(multipart_fields)
        .map(Form::from_pairs);

    let json = warp::body::json::<FormData>().map(Form::from_data);

    warp::body::content_length_limit(MAX_BODY_BYTES)
        .and(urlencoded.or(multipart).unify().or(json).unify())
}

/// Reads a boolean query flag. `1`, `true` and any other non-zero integer
/// count as set.
pub fn query_flag(query: &Query, key: &str) -> Result<bool, Error> {
    let value = match query.get(key).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => value,
        _ => return Ok(false),
    };

    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        number => number
            .parse::<i64>()
            .map(|n| n != 0)
            .map_err(|_| Error::validation(key, "Must be a valid boolean.")),
    }
}

/// Reads a comma separated list of ids, `None` when the parameter is absent
/// or empty.
pub fn query_ids(query: &Query, key: &str) -> Result<Option<Vec<Uuid>>, Error> {
    let value = match query.get(key).map(|v| v.trim()) {
        Some(value) if !value.is_empty() => value,
        _ => return Ok(None),
    };

    value
        .split(',')
        .map(|id| {
            id.trim()
                .parse::<Uuid>()
                .map_err(|_| Error::validation(key, format!("\"{id}\" is not a valid id.")))
        })
        .collect::<Result<Vec<Uuid>, Error>>()
        .map(Some)
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, body) = if let Some(error) = err.find::<Error>() {
        if error.status().is_server_error() {
            log::error!("{error}");
        }
        (error.status(), error.body())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, json!({ "detail": "Not found." }))
    } else if let Some(e) = err.find::<BodyDeserializeError>() {
        let error = Error::InvalidRequest(format!("JSON parse error - {e}"));
        (error.status(), error.body())
    } else if let Some(e) = err.find::<InvalidHeader>() {
        let error = Error::InvalidRequest(e.to_string());
        (error.status(), error.body())
    } else if let Some(e) = err.find::<InvalidQuery>() {
        let error = Error::InvalidRequest(e.to_string());
        (error.status(), error.body())
    } else if let Some(e) = err.find::<LengthRequired>() {
        (StatusCode::LENGTH_REQUIRED, json!({ "detail": e.to_string() }))
    } else if let Some(e) = err.find::<PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, json!({ "detail": e.to_string() }))
    } else if let Some(e) = err.find::<UnsupportedMediaType>() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            json!({ "detail": e.to_string() }),
        )
    } else if let Some(e) = err.find::<MethodNotAllowed>() {
        // Lowest priority: every other-method route on the same path adds one
        (StatusCode::METHOD_NOT_ALLOWED, json!({ "detail": e.to_string() }))
    } else {
        log::error!("> Unhandled rejection {err:?}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "detail": "A server error occurred." }),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> Query {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn flags_default_to_false() {
        assert!(!query_flag(&query(&[]), "assigned_only").unwrap());
        assert!(!query_flag(&query(&[("assigned_only", "")]), "assigned_only").unwrap());
        assert!(!query_flag(&query(&[("assigned_only", "0")]), "assigned_only").unwrap());
        assert!(!query_flag(&query(&[("assigned_only", "False")]), "assigned_only").unwrap());
    }

    #[test]
    fn truthy_flags() {
        for value in ["1", "2", "true", "TRUE"] {
            assert!(query_flag(&query(&[("assigned_only", value)]), "assigned_only").unwrap());
        }
    }

    #[test]
    fn invalid_flag_is_a_validation_error() {
        let result = query_flag(&query(&[("assigned_only", "yes please")]), "assigned_only");

        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn id_lists() {
        assert_eq!(query_ids(&query(&[]), "tags").unwrap(), None);
        assert_eq!(
            query_ids(&query(&[("tags", "1, 2,3")]), "tags").unwrap(),
            Some(vec![1, 2, 3])
        );
        assert!(query_ids(&query(&[("tags", "1,x")]), "tags").is_err());
    }
}
