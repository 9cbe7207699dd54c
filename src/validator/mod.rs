//! Field-level validation policies.
//!
//! Services depend on the [`Validator`] trait so a policy can change without touching
//! business logic. An empty result means the value is acceptable.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

use crate::database::models::TaskFields;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// First message per field, keyed by field name.
pub fn field_error_map(errors: &[FieldError]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for error in errors {
        map.entry(error.field.clone()).or_insert_with(|| error.message.clone());
    }
    map
}

pub trait Validator<T>: Send + Sync {
    fn validate(&self, value: &T) -> Vec<FieldError>;
}

/// Sign-up and login input.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub const TITLE_MAX_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskValidator;

impl Validator<TaskFields> for TaskValidator {
    fn validate(&self, task: &TaskFields) -> Vec<FieldError> {
        let mut errors = Vec::new();
        // Length counts characters, not bytes
        let len = task.title.chars().count();
        if len == 0 {
            errors.push(FieldError::new("title", "title is required"));
        } else if len > TITLE_MAX_CHARS {
            errors.push(FieldError::new("title", format!("limited max {TITLE_MAX_CHARS} char")));
        }
        errors
    }
}

pub const EMAIL_MAX_CHARS: usize = 30;
pub const PASSWORD_MIN_CHARS: usize = 6;
pub const PASSWORD_MAX_CHARS: usize = 30;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .unwrap_or_else(|e| panic!("email pattern must compile: {e}"))
});

#[derive(Debug, Clone, Copy, Default)]
pub struct UserValidator;

impl Validator<Credentials> for UserValidator {
    fn validate(&self, credentials: &Credentials) -> Vec<FieldError> {
        let mut errors = Vec::new();

        let email_len = credentials.email.chars().count();
        if email_len == 0 {
            errors.push(FieldError::new("email", "email is required"));
        } else if email_len > EMAIL_MAX_CHARS {
            errors.push(FieldError::new("email", format!("limited max {EMAIL_MAX_CHARS} char")));
        } else if !EMAIL_RE.is_match(&credentials.email) {
            errors.push(FieldError::new("email", "is not valid email format"));
        }

        let password_len = credentials.password.chars().count();
        if password_len == 0 {
            errors.push(FieldError::new("password", "password is required"));
        } else if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&password_len) {
            errors.push(FieldError::new(
                "password",
                format!("limited min {PASSWORD_MIN_CHARS} max {PASSWORD_MAX_CHARS} char"),
            ));
        }

        errors
    }
}
