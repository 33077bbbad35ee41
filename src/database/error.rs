use serde_json::{json, Value};
use thiserror::Error;
use warp::http::StatusCode;

/// A failed database round-trip. Only ever logged, never sent to clients.
#[derive(Error, Debug)]
#[error("({info})")]
pub struct QueryError {
    info: String,
}

impl QueryError {
    pub fn new(info: String) -> Self {
        Self { info }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(value: sqlx::Error) -> Self {
        let info = match &value {
            sqlx::Error::Database(e) => match e.code() {
                Some(code) => format!("{e} [{code}]"),
                None => e.to_string(),
            },
            sqlx::Error::PoolTimedOut => "Timed out waiting for a connection".to_owned(),
            other => other.to_string(),
        };
        Self::new(info)
    }
}

/// Every failure the API can surface. Each variant maps onto exactly one
/// status code; see [`Error::status`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication credentials were not provided.")]
    Unauthorized,

    #[error("Invalid session; {0}")]
    InvalidSession(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Not found.")]
    NotFound,

    #[error("Query failed {0}")]
    Query(#[from] QueryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_owned(),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Unauthorized | Error::InvalidSession(_) => StatusCode::UNAUTHORIZED,
            Error::Validation { .. } | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Query(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body sent to the client. Server-side failures are not echoed back.
    pub fn body(&self) -> Value {
        match self {
            Error::Validation { field, message } => json!({ field.as_str(): [message] }),
            Error::Query(_) | Error::Internal(_) => {
                json!({ "detail": "A server error occurred." })
            }
            other => json!({ "detail": other.to_string() }),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        Error::Query(QueryError::from(value))
    }
}

impl warp::reject::Reject for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_body_is_keyed_by_field() {
        let error = Error::validation("name", "This field may not be blank.");

        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error.body(),
            json!({ "name": ["This field may not be blank."] })
        );
    }

    #[test]
    fn internal_errors_hide_details() {
        let error: Error = QueryError::new("connection refused".to_owned()).into();

        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!error.body().to_string().contains("connection refused"));
    }

    #[test]
    fn session_errors_are_unauthorized() {
        assert_eq!(Error::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::InvalidSession("Token expired".into()).status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
