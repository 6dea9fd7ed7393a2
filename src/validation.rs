//! Field-shape checks run before any remote call.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const DISPLAY_NAME_MAX: usize = 50;
pub const BIO_MAX: usize = 500;
pub const SKILL_NAME_MAX: usize = 50;
pub const MESSAGE_MAX: usize = 1000;
pub const SESSION_TITLE_MAX: usize = 100;
pub const SESSION_DESCRIPTION_MAX: usize = 500;
pub const PASSWORD_MIN: usize = 6;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },

    #[error("{0} must be positive")]
    NotPositive(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least {} characters", PASSWORD_MIN)]
    PasswordTooShort,
}

/// Trims `value` and checks it is non-empty and at most `max` characters.
fn required(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    bounded(field, value, max)?;
    Ok(value.to_owned())
}

fn bounded(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

pub fn display_name(value: &str) -> Result<String, ValidationError> {
    required("Display name", value, DISPLAY_NAME_MAX)
}

pub fn bio(value: Option<&str>) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |bio| bounded("Bio", bio, BIO_MAX))
}

pub fn skill_name(value: &str) -> Result<String, ValidationError> {
    required("Skill name", value, SKILL_NAME_MAX)
}

pub fn message_content(value: &str) -> Result<String, ValidationError> {
    required("Message", value, MESSAGE_MAX)
}

pub fn session_title(value: &str) -> Result<String, ValidationError> {
    required("Session title", value, SESSION_TITLE_MAX)
}

pub fn session_description(value: Option<&str>) -> Result<(), ValidationError> {
    value.map_or(Ok(()), |d| bounded("Session description", d, SESSION_DESCRIPTION_MAX))
}

pub fn duration_minutes(value: i64) -> Result<i64, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NotPositive("Duration"));
    }
    Ok(value)
}

pub fn email(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if !EMAIL_PATTERN.is_match(value) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(value.to_owned())
}

pub fn password(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < PASSWORD_MIN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_trimmed_and_bounded() {
        assert_eq!(message_content("  hi \n").unwrap(), "hi");
        assert_eq!(message_content("   "), Err(ValidationError::Required("Message")));
        let long = "x".repeat(MESSAGE_MAX + 1);
        assert_eq!(
            message_content(&long),
            Err(ValidationError::TooLong { field: "Message", max: MESSAGE_MAX })
        );
    }

    #[test]
    fn display_name_limits() {
        assert!(display_name(&"a".repeat(DISPLAY_NAME_MAX)).is_ok());
        assert!(display_name(&"a".repeat(DISPLAY_NAME_MAX + 1)).is_err());
        assert_eq!(display_name(""), Err(ValidationError::Required("Display name")));
    }

    #[test]
    fn email_shape() {
        assert!(email("ada@example.com").is_ok());
        assert_eq!(email("  ada@mail.example.org ").unwrap(), "ada@mail.example.org");
        for bad in ["ada", "@example.com", "ada@", "ada@example", "ada@example.", "a da@example.com", "ada@@example.com"] {
            assert_eq!(email(bad), Err(ValidationError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn password_minimum() {
        assert!(password("secret").is_ok());
        assert_eq!(password("short"), Err(ValidationError::PasswordTooShort));
    }
}
