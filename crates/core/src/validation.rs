//! Input validation rules shared by registration, login and event writes.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{DomainError, DomainResult};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_USERNAME_LEN: usize = 2;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub fn validate_email(email: &str) -> DomainResult<()> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(DomainError::validation("email must be a valid email address"))
    }
}

/// Length is counted in characters, not bytes.
pub fn validate_min_len(field: &str, value: &str, min: usize) -> DomainResult<()> {
    if value.chars().count() < min {
        return Err(DomainError::validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(())
}

pub fn validate_not_blank(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn validate_registration(email: &str, password: &str, username: &str) -> DomainResult<()> {
    validate_email(email)?;
    validate_min_len("password", password, MIN_PASSWORD_LEN)?;
    validate_min_len("username", username, MIN_USERNAME_LEN)
}

pub fn validate_login(email: &str, password: &str) -> DomainResult<()> {
    validate_email(email)?;
    validate_min_len("password", password, MIN_PASSWORD_LEN)
}
