use std::collections::{hash_map::Entry, BTreeSet, HashMap};

use serde_json::Value;

use crate::constants::MAX_NAME_LENGTH;

use super::{error::Error, schema::Uuid};

pub type FormData = HashMap<String, Value>;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_AN_INTEGER: &str = "A valid integer is required.";
pub const NOT_A_NUMBER: &str = "A valid number is required.";
pub const NOT_A_LIST: &str = "Expected a list of items.";
pub const NEGATIVE: &str = "Ensure this value is greater than or equal to 0.";

pub struct Form {
    inner: HashMap<String, Value>,
    /// Set for form-encoded bodies, where a list field sent once arrives as
    /// a single string.
    flat: bool,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self {
            inner: data,
            flat: false,
        }
    }

    /// Fields of an urlencoded or multipart body. A key sent more than once
    /// becomes a list of its values, in order.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut inner: FormData = HashMap::new();

        for (key, value) in pairs {
            match inner.entry(key) {
                Entry::Vacant(entry) => {
                    entry.insert(Value::String(value));
                }
                Entry::Occupied(mut entry) => match entry.get_mut() {
                    Value::Array(items) => items.push(Value::String(value)),
                    existing => {
                        let first = existing.take();
                        *existing = Value::Array(vec![first, Value::String(value)]);
                    }
                },
            }
        }

        Self { inner, flat: true }
    }

    /// A key counts as present unless it is missing or explicitly `null`.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.get(key).is_some_and(|value| !value.is_null())
    }

    fn get(&self, key: &str) -> Result<&Value, Error> {
        match self.inner.get(key) {
            Some(value) if !value.is_null() => Ok(value),
            _ => Err(Error::validation(key, REQUIRED)),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<String, Error> {
        match self.get(key)?.as_str() {
            Some(v) => Ok(v.to_string()),
            None => Err(Error::validation(key, NOT_A_STRING)),
        }
    }

    /// A trimmed, non-blank string of at most [`MAX_NAME_LENGTH`] characters.
    pub fn get_name(&self, key: &str) -> Result<String, Error> {
        let value = self.get_str(key)?;
        let value = value.trim();

        if value.is_empty() {
            return Err(Error::validation(key, BLANK));
        }
        check_length(key, value)?;

        Ok(value.to_string())
    }

    /// Like [`Form::get_name`] but blank is allowed.
    pub fn get_text(&self, key: &str) -> Result<String, Error> {
        let value = self.get_str(key)?;
        let value = value.trim();
        check_length(key, value)?;

        Ok(value.to_string())
    }

    /// Non-negative integer, given either as a JSON number or a numeric string.
    pub fn get_count(&self, key: &str) -> Result<i32, Error> {
        let value: i64 = match self.get(key)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| Error::validation(key, NOT_AN_INTEGER))?;

        if value < 0 {
            return Err(Error::validation(key, NEGATIVE));
        }

        i32::try_from(value).map_err(|_| Error::validation(key, NOT_AN_INTEGER))
    }

    /// Finite, non-negative number, given either as a JSON number or a
    /// numeric string.
    pub fn get_amount(&self, key: &str) -> Result<f64, Error> {
        let value: f64 = match self.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::validation(key, NOT_A_NUMBER))?;

        if value < 0. {
            return Err(Error::validation(key, NEGATIVE));
        }

        Ok(value)
    }

    /// A list of primary keys, sorted and without duplicates. Elements may be
    /// numbers or numeric strings.
    pub fn get_id_list(&self, key: &str) -> Result<Vec<Uuid>, Error> {
        let value = self.get(key)?;
        let items: &[Value] = match value {
            Value::Array(items) => items,
            Value::String(s) if self.flat && s.trim().is_empty() => &[],
            Value::String(_) if self.flat => std::slice::from_ref(value),
            _ => return Err(Error::validation(key, NOT_A_LIST)),
        };

        let ids = items
            .iter()
            .map(|item| {
                match item {
                    Value::Number(n) => n.as_i64(),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                }
                .and_then(|id| Uuid::try_from(id).ok())
                .ok_or_else(|| {
                    Error::validation(
                        key,
                        format!("Incorrect type. Expected pk value, received {item}."),
                    )
                })
            })
            .collect::<Result<BTreeSet<Uuid>, Error>>()?;

        Ok(ids.into_iter().collect())
    }
}

fn check_length(key: &str, value: &str) -> Result<(), Error> {
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(Error::validation(
            key,
            format!("Ensure this field has no more than {MAX_NAME_LENGTH} characters."),
        ));
    }
    Ok(())
}
