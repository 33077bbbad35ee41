use std::sync::Arc;

use warp::{
    http::header::{HeaderMap, AUTHORIZATION, COOKIE},
    reject::Rejection,
    Filter,
};

use crate::{
    constants::{AUTHORIZATION_SCHEMES, SESSION_COOKIE},
    error::Error,
};

use super::jwt::{SessionData, SessionKeys};

fn invalid_header(name: &str) -> Error {
    Error::InvalidSession(format!("Invalid {name} header"))
}

fn bearer_token(header: &str) -> Result<String, Error> {
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or_else(|| invalid_header("authorization"))?;

    if !AUTHORIZATION_SCHEMES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(scheme))
    {
        return Err(Error::InvalidSession(
            "Unsupported authorization scheme".to_owned(),
        ));
    }

    Ok(token.trim().to_owned())
}

/// Value of the session cookie, looked up in every `Cookie` header.
fn session_cookie(headers: &HeaderMap) -> Result<Option<String>, Error> {
    for value in headers.get_all(COOKIE) {
        let value = value.to_str().map_err(|_| invalid_header("cookie"))?;

        let session = value
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE);

        if let Some((_, token)) = session {
            return Ok(Some(token.trim_matches('"').to_owned()));
        }
    }
    Ok(None)
}

/// Picks the session token out of an `Authorization: Bearer <token>` (or
/// `Token <token>`) header, falling back to the session cookie. Header bytes
/// that are not visible ASCII count as an invalid session.
fn session_token(headers: &HeaderMap) -> Result<String, Error> {
    if let Some(header) = headers.get(AUTHORIZATION) {
        let header = header
            .to_str()
            .map_err(|_| invalid_header("authorization"))?;
        return bearer_token(header);
    }

    session_cookie(headers)?.ok_or(Error::Unauthorized)
}

async fn authenticate(keys: Arc<SessionKeys>, headers: HeaderMap) -> Result<SessionData, Rejection> {
    let token = session_token(&headers)?;

    Ok(keys.verify_jwt_session(&token)?)
}

pub fn with_session(
    keys: Arc<SessionKeys>,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    warp::header::headers_cloned()
        .and_then(move |headers: HeaderMap| authenticate(keys.clone(), headers))
}

#[cfg(test)]
mod tests {
    use warp::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_bytes(value.as_bytes()).unwrap());
        }
        map
    }

    #[test]
    fn bearer_and_token_schemes_are_accepted() {
        for header in ["Bearer abc", "Token abc", "bearer abc"] {
            let map = headers(&[("authorization", header)]);

            assert_eq!(session_token(&map).unwrap(), "abc");
        }
    }

    #[test]
    fn header_wins_over_cookie() {
        let map = headers(&[
            ("authorization", "Bearer header"),
            ("cookie", "session=cookie"),
        ]);

        assert_eq!(session_token(&map).unwrap(), "header");
    }

    #[test]
    fn cookie_is_used_without_header() {
        let map = headers(&[("cookie", "theme=dark; session=cookie")]);

        assert_eq!(session_token(&map).unwrap(), "cookie");
    }

    #[test]
    fn missing_credentials_are_unauthorized() {
        assert!(matches!(
            session_token(&HeaderMap::new()),
            Err(Error::Unauthorized)
        ));
        assert!(matches!(
            session_token(&headers(&[("cookie", "theme=dark")])),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn unknown_scheme_is_invalid() {
        let map = headers(&[("authorization", "Basic abc")]);

        assert!(matches!(session_token(&map), Err(Error::InvalidSession(_))));
    }

    #[test]
    fn non_ascii_headers_are_invalid_sessions() {
        for name in ["authorization", "cookie"] {
            let map = headers(&[(name, "Bearer café")]);

            assert!(matches!(session_token(&map), Err(Error::InvalidSession(_))));
        }
    }
}
