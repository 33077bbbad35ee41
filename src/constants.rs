pub const MAX_NAME_LENGTH: usize = 255;
pub const MIN_PASSWORD_LENGTH: usize = 5;

// Prices are stored with two decimal places and at most five digits
pub const PRICE_DECIMAL_PLACES: i32 = 2;
pub const MAX_PRICE: f64 = 999.99;

pub const MAX_BODY_BYTES: u64 = 64 * 1024;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SESSION_LIFETIME_HOURS: i64 = 24;

pub const SESSION_COOKIE: &str = "session";
pub const AUTHORIZATION_SCHEMES: &[&str] = &["Bearer", "Token"];
