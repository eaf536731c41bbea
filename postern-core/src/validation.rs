use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;

/// Centralized validation for the contact and auth boundaries.
///
/// These are the hard checks applied before anything is handed to an
/// external collaborator; advisory strength feedback lives in
/// [`crate::password`].
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Invalid email regex pattern")
});

/// Validates an email address against a practical subset of RFC 5322.
///
/// # Examples
///
/// ```
/// use postern_core::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid-email").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::MissingField("email".to_string()));
    }

    if email.len() > 254 {
        return Err(ValidationError::InvalidEmail(
            "Email is too long".to_string(),
        ));
    }

    if EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(format!(
            "Invalid email format: {email}"
        )))
    }
}

/// Validates a password's shape: 8..=128 characters, not blank.
///
/// This is the hard precondition for sign-up; it says nothing about
/// strength.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField("password".to_string()));
    }

    if password.trim().is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password cannot be only whitespace".to_string(),
        ));
    }

    if password.len() < 8 {
        return Err(ValidationError::InvalidPassword(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(ValidationError::InvalidPassword(
            "Password must be no more than 128 characters long".to_string(),
        ));
    }

    Ok(())
}

/// Validates a required free-text field against a length cap.
///
/// The value must contain at least one non-whitespace character and at most
/// `max_len` characters.
pub fn validate_text_field(
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field.to_string()));
    }

    if value.chars().count() > max_len {
        return Err(ValidationError::FieldTooLong(format!(
            "{field} must be no more than {max_len} characters long"
        )));
    }

    Ok(())
}
