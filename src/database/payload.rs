//! Request payloads, validated field by field out of a [`Form`].

use crate::constants::{MAX_PRICE, MIN_PASSWORD_LENGTH, PRICE_DECIMAL_PLACES};

use super::{
    error::Error,
    form::Form,
    schema::{Recipe, RecipeDraft},
};

/// Parses `key` when the payload carries it, otherwise falls back. Without a
/// fallback the field is required.
fn field<T>(
    form: &Form,
    key: &str,
    fallback: Option<T>,
    parse: impl Fn(&Form, &str) -> Result<T, Error>,
) -> Result<T, Error> {
    match fallback {
        Some(value) if !form.contains(key) => Ok(value),
        _ => parse(form, key),
    }
}

fn get_price(form: &Form, key: &str) -> Result<f64, Error> {
    let price = form.get_amount(key)?;
    let scale = 10f64.powi(PRICE_DECIMAL_PLACES);
    let rounded = (price * scale).round() / scale;

    if (rounded - price).abs() > f64::EPSILON * scale {
        return Err(Error::validation(
            key,
            format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."),
        ));
    }
    if rounded > MAX_PRICE {
        return Err(Error::validation(
            key,
            "Ensure that there are no more than 5 digits in total.",
        ));
    }

    Ok(rounded)
}

impl RecipeDraft {
    /// Payload of a recipe creation. Title, time and price are required.
    pub fn from_form(form: &Form) -> Result<Self, Error> {
        Self {
            title: String::new(),
            time_minutes: 0,
            price: 0.,
            link: String::new(),
            tags: vec![],
            ingredients: vec![],
        }
        .merge(form, true)
    }

    /// Payload of a recipe update. A full update (`partial == false`) still
    /// requires title, time and price; anything else left out keeps its
    /// current value.
    pub fn update(recipe: &Recipe, form: &Form, partial: bool) -> Result<Self, Error> {
        RecipeDraft::from(recipe).merge(form, !partial)
    }

    fn merge(self, form: &Form, require_core: bool) -> Result<Self, Error> {
        let optional = !require_core;

        Ok(Self {
            title: field(form, "title", optional.then_some(self.title), Form::get_name)?,
            time_minutes: field(
                form,
                "time_minutes",
                optional.then_some(self.time_minutes),
                Form::get_count,
            )?,
            price: field(form, "price", optional.then_some(self.price), get_price)?,
            link: field(form, "link", Some(self.link), Form::get_text)?,
            tags: field(form, "tags", Some(self.tags), Form::get_id_list)?,
            ingredients: field(form, "ingredients", Some(self.ingredients), Form::get_id_list)?,
        })
    }
}

/// Lower-cases the domain part, like most mail systems treat it.
pub fn normalize_email(email: &str) -> Option<String> {
    let email = email.trim();
    let (local, domain) = email.rsplit_once('@')?;

    if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
        return None;
    }

    Some(format!("{local}@{}", domain.to_lowercase()))
}

fn get_email(form: &Form, key: &str) -> Result<String, Error> {
    let email = form.get_name(key)?;
    normalize_email(&email).ok_or_else(|| Error::validation(key, "Enter a valid email address."))
}

fn get_password(form: &Form, key: &str) -> Result<String, Error> {
    let password = form.get_str(key)?;

    if password.is_empty() {
        return Err(Error::validation(key, super::form::BLANK));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(Error::validation(
            key,
            format!("Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."),
        ));
    }

    Ok(password)
}

/// Sign-up payload; the password is still plain text here.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl Registration {
    pub fn from_form(form: &Form) -> Result<Self, Error> {
        Ok(Self {
            email: get_email(form, "email")?,
            password: get_password(form, "password")?,
            name: form.get_name("name")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_form(form: &Form) -> Result<Self, Error> {
        Ok(Self {
            email: get_email(form, "email")?,
            password: form.get_str("password")?,
        })
    }
}

/// Changes to the caller's own profile; the password is still plain text.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

impl ProfileUpdate {
    pub fn from_form(form: &Form, partial: bool) -> Result<Self, Error> {
        let optional = |key: &str| !form.contains(key) && partial;

        Ok(Self {
            name: match optional("name") {
                true => None,
                false => Some(form.get_name("name")?),
            },
            password: match optional("password") {
                true => None,
                false => Some(get_password(form, "password")?),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn form(value: Value) -> Form {
        Form::from_data(serde_json::from_value(value).unwrap())
    }

    fn failed_field(error: Error) -> String {
        match error {
            Error::Validation { field, .. } => field,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    fn stored() -> Recipe {
        Recipe {
            id: 3,
            user_id: 1,
            title: String::from("Meat Pie"),
            ingredients: vec![1, 2],
            tags: vec![5],
            time_minutes: 90,
            price: 12.0,
            link: String::from("https://example.com/pie"),
        }
    }

    #[test]
    fn basic_recipe_has_empty_associations() {
        let draft = RecipeDraft::from_form(&form(json!({
            "title": "Chocolate cheesecake",
            "time_minutes": 30,
            "price": 4.00
        })))
        .unwrap();

        assert_eq!(draft.title, "Chocolate cheesecake");
        assert_eq!(draft.time_minutes, 30);
        assert_eq!(draft.price, 4.0);
        assert_eq!(draft.link, "");
        assert!(draft.tags.is_empty());
        assert!(draft.ingredients.is_empty());
    }

    #[test]
    fn creation_requires_title_time_and_price() {
        let missing_title = form(json!({ "time_minutes": 30, "price": 4 }));
        let missing_time = form(json!({ "title": "Pie", "price": 4 }));
        let missing_price = form(json!({ "title": "Pie", "time_minutes": 30 }));
        let blank_title = form(json!({ "title": "", "time_minutes": 30, "price": 4 }));

        assert_eq!(failed_field(RecipeDraft::from_form(&missing_title).unwrap_err()), "title");
        assert_eq!(failed_field(RecipeDraft::from_form(&missing_time).unwrap_err()), "time_minutes");
        assert_eq!(failed_field(RecipeDraft::from_form(&missing_price).unwrap_err()), "price");
        assert_eq!(failed_field(RecipeDraft::from_form(&blank_title).unwrap_err()), "title");
    }

    #[test]
    fn prices_keep_two_decimal_places() {
        let ok = form(json!({ "title": "Pie", "time_minutes": 1, "price": "5.25" }));
        let precise = form(json!({ "title": "Pie", "time_minutes": 1, "price": 5.255 }));
        let large = form(json!({ "title": "Pie", "time_minutes": 1, "price": 1000 }));

        assert_eq!(RecipeDraft::from_form(&ok).unwrap().price, 5.25);
        assert_eq!(failed_field(RecipeDraft::from_form(&precise).unwrap_err()), "price");
        assert_eq!(failed_field(RecipeDraft::from_form(&large).unwrap_err()), "price");
    }

    #[test]
    fn partial_update_keeps_everything_left_out() {
        let draft = RecipeDraft::update(&stored(), &form(json!({ "title": "Pork Pie" })), true)
            .unwrap();

        assert_eq!(draft.title, "Pork Pie");
        assert_eq!(draft.time_minutes, 90);
        assert_eq!(draft.tags, vec![5]);
        assert_eq!(draft.ingredients, vec![1, 2]);
        assert_eq!(draft.link, "https://example.com/pie");
    }

    #[test]
    fn full_update_requires_core_fields_only() {
        let missing = form(json!({ "title": "Pork Pie" }));
        let complete = form(json!({ "title": "Pork Pie", "time_minutes": 60, "price": 9, "tags": [] }));

        assert_eq!(
            failed_field(RecipeDraft::update(&stored(), &missing, false).unwrap_err()),
            "time_minutes"
        );

        let draft = RecipeDraft::update(&stored(), &complete, false).unwrap();
        assert!(draft.tags.is_empty());
        assert_eq!(draft.ingredients, vec![1, 2]);
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(
            normalize_email(" Test@EXAMPLE.com ").as_deref(),
            Some("Test@example.com")
        );
        assert_eq!(normalize_email("no-at-sign"), None);
        assert_eq!(normalize_email("@example.com"), None);
        assert_eq!(normalize_email("a b@example.com"), None);
    }

    #[test]
    fn registration_checks_password_length() {
        let short = form(json!({ "email": "test@example.com", "password": "pw", "name": "Test" }));

        assert_eq!(failed_field(Registration::from_form(&short).unwrap_err()), "password");
    }

    #[test]
    fn profile_update_is_partial_on_patch() {
        let update = ProfileUpdate::from_form(&form(json!({ "name": "New name" })), true).unwrap();
        assert_eq!(update.name.as_deref(), Some("New name"));
        assert!(update.password.is_none());

        let full = ProfileUpdate::from_form(&form(json!({ "name": "New name" })), false);
        assert_eq!(failed_field(full.unwrap_err()), "password");
    }
}
