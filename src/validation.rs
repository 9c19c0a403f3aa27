use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles");
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

pub fn check_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

pub fn check_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        })
    } else {
        Ok(())
    }
}

pub fn check_engagement(engagement: f64) -> Result<(), ValidationError> {
    if (0.0..=100.0).contains(&engagement) {
        Ok(())
    } else {
        Err(ValidationError::EngagementOutOfRange)
    }
}
