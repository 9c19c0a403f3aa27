use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};

use crate::error::{StoreError, ValidationError};
use crate::models::{User, UserRole};
use crate::validation;

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Option<UserRole>,
}

/// Checks required fields, email shape, password length and uniqueness, in
/// that order, so the first failure is the one reported.
pub fn validate_registration(
    form: &Registration,
    users: &[User],
) -> Result<UserRole, ValidationError> {
    validation::require("name", &form.name)?;
    validation::require("email", &form.email)?;
    validation::require("username", &form.username)?;
    if form.password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    let role = form.role.ok_or(ValidationError::MissingField("role"))?;

    validation::check_email(&form.email)?;
    validation::check_password(&form.password)?;

    let taken = users
        .iter()
        .any(|u| u.username == form.username || u.email == form.email);
    if taken {
        return Err(ValidationError::DuplicateAccount);
    }

    Ok(role)
}

pub fn hash_password(password: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| StoreError::Hashing(err.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

pub fn build_user(
    form: &Registration,
    role: UserRole,
    id: String,
    created_at: DateTime<Utc>,
) -> Result<User, StoreError> {
    Ok(User {
        id,
        username: form.username.clone(),
        email: form.email.clone(),
        name: form.name.clone(),
        role,
        password_hash: hash_password(&form.password)?,
        created_at,
    })
}

pub fn find_by_credentials<'a>(users: &'a [User], login: &str, password: &str) -> Option<&'a User> {
    users
        .iter()
        .filter(|u| u.username == login || u.email == login)
        .find(|u| verify_password(password, &u.password_hash))
}
