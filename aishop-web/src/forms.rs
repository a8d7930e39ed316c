/// HTML form parsing and validation
///
/// Forms arrive as `application/x-www-form-urlencoded` bodies where every
/// field is a string (possibly empty). Each form struct keeps the raw
/// strings so they can be echoed back on re-render, and `clean()` turns
/// them into typed data or a [`FormErrors`] map keyed by field name.

use aishop_shared::auth::password;
use aishop_shared::models::user::{CreateUser, Gender, UpdateProfile};
use serde::Deserialize;
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

pub const REQUIRED: &str = "This field is required.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const INVALID_USERNAME: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const INVALID_LOGIN: &str = "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Field-level validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Replaces all messages on a field with one message
    pub fn set(&mut self, field: &str, message: impl Into<String>) {
        self.fields.insert(field.to_string(), vec![message.into()]);
    }

    /// Messages for a field (empty when the field is valid)
    pub fn field(&self, field: &str) -> Vec<String> {
        self.fields.get(field).cloned().unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of messages across all fields
    pub fn count(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(e: ValidationErrors) -> Self {
        let mut errors = FormErrors::new();
        for (field, field_errors) in e.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Enter a valid value.".to_string());
                errors.add(&field.to_string(), message);
            }
        }
        errors
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn parse_age(raw: &str, errors: &mut FormErrors) -> Option<i32> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    match raw.parse::<i32>() {
        Ok(age) if age < 0 => {
            errors.add("age", "Ensure this value is greater than or equal to 0.");
            None
        }
        Ok(age) => Some(age),
        Err(_) => {
            errors.add("age", "Enter a whole number.");
            None
        }
    }
}

fn parse_gender(raw: &str, errors: &mut FormErrors) -> Option<Gender> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let gender = Gender::from_code(raw);
    if gender.is_none() {
        errors.add(
            "gender",
            format!("Select a valid choice. {} is not one of the available choices.", raw),
        );
    }
    gender
}

/// Signup form as submitted
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub username: String,

    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 20, message = "Ensure this value has at most 20 characters."))]
    pub phone: String,

    #[serde(default)]
    #[validate(length(max = 50, message = "Ensure this value has at most 50 characters."))]
    pub name: String,

    #[serde(default)]
    pub age: String,

    #[serde(default)]
    pub gender: String,

    #[serde(default)]
    pub password1: String,

    #[serde(default)]
    pub password2: String,
}

/// Signup data that passed validation
#[derive(Debug, Clone)]
pub struct CleanSignup {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
}

impl CleanSignup {
    /// Builds the store input; the plaintext password goes no further
    pub fn into_create_user(self, password_hash: String) -> CreateUser {
        CreateUser {
            username: self.username,
            email: self.email,
            password_hash,
            name: self.name,
            age: self.age,
            gender: self.gender,
            phone: self.phone,
        }
    }
}

impl SignupForm {
    /// Trims text fields; passwords are kept exactly as typed
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            name: self.name.trim().to_string(),
            age: self.age.trim().to_string(),
            gender: self.gender.trim().to_string(),
            password1: self.password1,
            password2: self.password2,
        }
    }

    /// Validates everything that does not need the identity store
    ///
    /// Username uniqueness is checked by the caller.
    pub fn clean(&self) -> Result<CleanSignup, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        if !self.username.is_empty() && !is_valid_username(&self.username) {
            errors.add("username", INVALID_USERNAME);
        }

        let age = parse_age(&self.age, &mut errors);
        let gender = parse_gender(&self.gender, &mut errors);

        if !self.password1.is_empty() && !self.password2.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", PASSWORD_MISMATCH);
            } else if let Err(messages) = password::validate_password(
                &self.password2,
                &[
                    ("username", self.username.as_str()),
                    ("email address", self.email.as_str()),
                    ("name", self.name.as_str()),
                ],
            ) {
                for message in messages {
                    errors.add("password2", message);
                }
            }
        }

        for (field, value) in [
            ("username", &self.username),
            ("email", &self.email),
            ("password1", &self.password1),
            ("password2", &self.password2),
        ] {
            if value.is_empty() {
                errors.set(field, REQUIRED);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(CleanSignup {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password1.clone(),
            phone: optional(&self.phone),
            name: optional(&self.name),
            age,
            gender,
        })
    }
}

/// Login form as submitted
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Page to return to after login
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Presence check; credentials themselves are checked by the handler
    pub fn clean(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::new();
        let username = self.username.trim();

        if username.is_empty() {
            errors.set("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.set("password", REQUIRED);
        }

        if errors.is_empty() {
            Ok((username.to_string(), self.password.clone()))
        } else {
            Err(errors)
        }
    }
}

/// Profile edit form as submitted
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(length(max = 50, message = "Ensure this value has at most 50 characters."))]
    pub name: String,

    #[serde(default)]
    pub age: String,

    #[serde(default)]
    pub gender: String,

    #[serde(default)]
    #[validate(length(max = 20, message = "Ensure this value has at most 20 characters."))]
    pub phone: String,
}

impl ProfileForm {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            age: self.age.trim().to_string(),
            gender: self.gender.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }

    pub fn clean(&self) -> Result<UpdateProfile, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let age = parse_age(&self.age, &mut errors);
        let gender = parse_gender(&self.gender, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(UpdateProfile {
            name: optional(&self.name),
            age,
            gender,
            phone: optional(&self.phone),
        })
    }
}

/// True when `next` is a path on this site
///
/// Rejects absolute URLs, scheme-relative `//host` paths and backslash
/// tricks so a login link cannot bounce the visitor to another origin.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.contains("://")
        && !next.chars().any(|c| c.is_control())
}
