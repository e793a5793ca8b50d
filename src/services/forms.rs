//! Guest-detail form validation.
//!
//! Problems are accumulated per field and reported together — the form is
//! redisplayed with every message attached, never failed on the first
//! issue.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::GuestDetails;

/// Field name → messages, in stable field order for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }
}

/// Raw guest form input as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuestForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl GuestForm {
    /// Validate and convert to [`GuestDetails`].
    ///
    /// Rules: first/last name and email are required, the first name needs
    /// at least 3 characters, the email must look like an address.
    pub fn validate(self) -> Result<GuestDetails, FieldErrors> {
        let mut errors = FieldErrors::default();

        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("email", &self.email),
        ] {
            if value.trim().is_empty() {
                errors.add(field, "This field can not be empty.");
            }
        }

        if self.first_name.chars().count() < 3 {
            errors.add("first_name", "This field needs at least 3 characters");
        }

        if !self.email.trim().is_empty() && !is_valid_email(self.email.trim()) {
            errors.add("email", "Invalid e-mail address");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(GuestDetails {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        })
    }
}

/// Well-formedness check for addresses: one `@`, non-empty local part, a
/// dotted domain without whitespace. Deliverability is not our problem.
fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if value.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}
