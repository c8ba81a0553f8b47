//! Field validation and sanitization for registration input.
//!
//! Validators reject a value with a user-facing reason and never alter it.
//! Sanitizers never reject; they strip or truncate until the value fits the
//! stored column. A name or mobile number that validates sanitizes to
//! itself, and a valid email only loses surrounding whitespace and case.

use crate::models::NewRegistration;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

pub const NAME_MAX_LENGTH: usize = 100;
pub const EMAIL_MAX_LENGTH: usize = 255;
pub const TEXT_MAX_LENGTH: usize = 200;
const MOBILE_MIN_DIGITS: usize = 10;
const MOBILE_MAX_DIGITS: usize = 11;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("invalid email pattern")
});

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\sñÑ-]+$").expect("invalid name pattern"));

static NAME_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z\sñÑ-]").expect("invalid name pattern"));

static TEXT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\s.,\-'&()]+$").expect("invalid text pattern"));

// Markup and quoting characters removed from free text before storage
const TEXT_DANGEROUS: [char; 5] = ['<', '>', '"', '\'', '`'];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Email address is too long")]
    EmailTooLong,
    #[error("Only letters, spaces, ñ, Ñ, and hyphens are allowed")]
    InvalidName,
    #[error("Name must be less than 100 characters")]
    NameTooLong,
    #[error("Only numbers are allowed")]
    NotNumeric,
    #[error("Mobile number must be 10 or 11 digits")]
    MobileLength,
    #[error("{field} must be less than {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} contains invalid characters")]
    InvalidCharacters { field: &'static str },
}

/// A validation failure tied to the form field that caused it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: ValidationError,
}

pub type Validation = std::result::Result<(), ValidationError>;

pub fn validate_email(value: &str) -> Validation {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required);
    }
    if !EMAIL_PATTERN.is_match(value) {
        return Err(ValidationError::InvalidEmail);
    }
    if value.chars().count() > EMAIL_MAX_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    Ok(())
}

pub fn validate_name(value: &str) -> Validation {
    if value.is_empty() {
        return Err(ValidationError::Required);
    }
    if !NAME_PATTERN.is_match(value) {
        return Err(ValidationError::InvalidName);
    }
    if value.chars().count() > NAME_MAX_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

pub fn validate_mobile_number(value: &str) -> Validation {
    if value.is_empty() {
        return Err(ValidationError::Required);
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotNumeric);
    }
    if !(MOBILE_MIN_DIGITS..=MOBILE_MAX_DIGITS).contains(&value.len()) {
        return Err(ValidationError::MobileLength);
    }
    Ok(())
}

/// Validates free text such as a company or position. `field` is the label
/// used in the failure message.
pub fn validate_text(value: &str, field: &'static str, max: usize) -> Validation {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required);
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    if !TEXT_PATTERN.is_match(value) {
        return Err(ValidationError::InvalidCharacters { field });
    }
    Ok(())
}

pub fn sanitize_email(value: &str) -> String {
    truncate(&value.trim().to_lowercase(), EMAIL_MAX_LENGTH)
}

pub fn sanitize_name(value: &str) -> String {
    truncate(&NAME_DISALLOWED.replace_all(value, ""), NAME_MAX_LENGTH)
}

pub fn sanitize_mobile_number(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_digit)
        .take(MOBILE_MAX_DIGITS)
        .collect()
}

pub fn sanitize_text(value: &str, max: usize) -> String {
    let stripped: String = value.chars().filter(|c| !TEXT_DANGEROUS.contains(c)).collect();
    truncate(stripped.trim(), max)
}

fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

impl NewRegistration {
    /// Checks every field in form order and reports the first failure.
    ///
    /// With `require_affiliation` unset an empty company or position is
    /// admitted; a non-empty one is still checked.
    pub fn validate(&self, require_affiliation: bool) -> std::result::Result<(), FieldError> {
        let field = |field: &'static str, result: Validation| {
            result.map_err(|reason| FieldError { field, reason })
        };
        let affiliation = |value: &str, label: &'static str| {
            if !require_affiliation && value.trim().is_empty() {
                Ok(())
            } else {
                validate_text(value, label, TEXT_MAX_LENGTH)
            }
        };

        field("firstName", validate_name(&self.first_name))?;
        field("lastName", validate_name(&self.last_name))?;
        field("mobileNumber", validate_mobile_number(&self.mobile_number))?;
        field("email", validate_email(&self.email))?;
        field("company", affiliation(&self.company, "Company"))?;
        field("position", affiliation(&self.position, "Position"))?;
        Ok(())
    }

    /// Normalizes every field into its stored form.
    pub fn sanitize(self) -> NewRegistration {
        NewRegistration {
            first_name: sanitize_name(&self.first_name),
            last_name: sanitize_name(&self.last_name),
            mobile_number: sanitize_mobile_number(&self.mobile_number),
            email: sanitize_email(&self.email),
            company: sanitize_text(&self.company, TEXT_MAX_LENGTH),
            position: sanitize_text(&self.position, TEXT_MAX_LENGTH),
        }
    }
}
