use std::{env, fmt::Display, fs::read_to_string, net::SocketAddr, str::FromStr};

use chrono::Duration;

use crate::{
    constants::{
        DEFAULT_HOST, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT, DEFAULT_SESSION_LIFETIME_HOURS,
    },
    cryptography::generate_secret,
    error::Error,
};

pub struct Config {
    pub address: SocketAddr,
    /// `None` runs the API on the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub session_secret: String,
    pub session_lifetime: Duration,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let host: String = try_load(&lookup, "RECIPE_API_HOST", DEFAULT_HOST)?;
        let port: u16 = try_load(&lookup, "RECIPE_API_PORT", &DEFAULT_PORT.to_string())?;
        let address = format!("{host}:{port}")
            .parse()
            .map_err(|e| Error::Internal(format!("Invalid listen address {host}:{port}: {e}")))?;

        let session_lifetime_hours: i64 = try_load(
            &lookup,
            "SESSION_LIFETIME_HOURS",
            &DEFAULT_SESSION_LIFETIME_HOURS.to_string(),
        )?;
        if !(1..=24 * 365).contains(&session_lifetime_hours) {
            return Err(Error::Internal(format!(
                "SESSION_LIFETIME_HOURS must be between 1 and 8760, got {session_lifetime_hours}"
            )));
        }

        Ok(Self {
            address,
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            max_connections: try_load(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                &DEFAULT_MAX_CONNECTIONS.to_string(),
            )?,
            session_secret: session_secret(&lookup)?,
            session_lifetime: Duration::hours(session_lifetime_hours),
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, Error>
where
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            log::info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .trim()
        .parse()
        .map_err(|e| Error::Internal(format!("Invalid {key} value: {e}")))
}

/// `SESSION_SECRET`, else the contents of `SESSION_SECRET_FILE`, else a random
/// secret that only lives as long as the process.
fn session_secret(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, Error> {
    if let Some(secret) = lookup("SESSION_SECRET").filter(|s| !s.is_empty()) {
        return Ok(secret);
    }

    if let Some(path) = lookup("SESSION_SECRET_FILE") {
        return read_to_string(&path)
            .map(|s| s.trim().to_string())
            .map_err(|e| Error::Internal(format!("Failed to read session secret from {path}: {e}")));
    }

    log::warn!("SESSION_SECRET not set, sessions will not survive a restart");
    Ok(generate_secret(64))
}
