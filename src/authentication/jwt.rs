use chrono::Duration;
use chrono::Local;
use hmac::{Hmac, Mac};
use jwt::SignWithKey;
use jwt::VerifyWithKey;
use serde::Deserialize;
use serde::Serialize;
use sha2::Sha256;

use crate::error::Error;
use crate::schema::{User, Uuid};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSessionData {
    pub user_id: Uuid,
    pub email: String,
    iat: i64,
    exp: i64,
}

impl JwtSessionData {
    pub fn new(id: Uuid, email: String, lifetime: Duration) -> Self {
        let now = Local::now();
        let iat = now.timestamp();
        let exp = (now + lifetime).timestamp();

        Self {
            user_id: id,
            email,
            iat,
            exp,
        }
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionData {
    pub user_id: Uuid,
    pub email: String,
}

impl From<JwtSessionData> for SessionData {
    fn from(value: JwtSessionData) -> Self {
        SessionData {
            user_id: value.user_id,
            email: value.email,
        }
    }
}

/// Signing key and lifetime of session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    key: Hmac<Sha256>,
    lifetime: Duration,
}

impl SessionKeys {
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, Error> {
        let key: Hmac<Sha256> = Hmac::new_from_slice(secret)
            .map_err(|e| Error::Internal(format!("Invalid session secret: {e}")))?;

        Ok(Self { key, lifetime })
    }

    pub fn generate_jwt_session(&self, user: &User) -> Result<String, Error> {
        let claims = JwtSessionData::new(user.id, user.email.to_owned(), self.lifetime);

        claims
            .sign_with_key(&self.key)
            .map_err(|e| Error::Internal(format!("Failed to sign session: {e}")))
    }

    pub fn verify_jwt_session(&self, token: &str) -> Result<SessionData, Error> {
        let session: JwtSessionData = token
            .verify_with_key(&self.key)
            .map_err(|_| Error::InvalidSession("Invalid token".to_owned()))?;

        let now = Local::now().timestamp();
        if (session.exp - now).is_negative() {
            return Err(Error::InvalidSession("Token expired".to_owned()));
        }

        Ok(session.into())
    }
}
