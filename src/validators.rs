/// Form validators - reject obviously bad login/registration input before it
/// reaches the backend. The backend remains the authority; these checks only
/// save a round trip and give a clearer message.

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::ValidationError;
use crate::session::{LoginCredentials, RegisterData};

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MAX_USERNAME_LENGTH: usize = 150;
const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 128;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    static ref USERNAME_REGEX: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();
}

/// Validates an email address and returns it trimmed
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }

    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort("email", MIN_EMAIL_LENGTH));
    }

    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong("email", MAX_EMAIL_LENGTH));
    }

    if !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    Ok(trimmed.to_string())
}

/// Validates a username (same character set the backend accepts)
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let trimmed = username.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("username"));
    }

    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong("username", MAX_USERNAME_LENGTH));
    }

    if !USERNAME_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("username"));
    }

    Ok(trimmed.to_string())
}

fn check_password(field: &'static str, password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong(field, MAX_PASSWORD_LENGTH));
    }
    Ok(())
}

/// Checks a password being set (registration, password change): at least
/// six characters and equal to its confirmation. Existing passwords at login
/// are only checked for presence.
pub fn validate_new_password(
    field: &'static str,
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    check_password(field, password)?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort(field, MIN_PASSWORD_LENGTH));
    }
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// Normalizes login credentials, failing on empty or malformed fields
pub fn validate_login(credentials: &LoginCredentials) -> Result<LoginCredentials, ValidationError> {
    let email = is_valid_email(&credentials.email)?;
    check_password("password", &credentials.password)?;

    Ok(LoginCredentials {
        email,
        password: credentials.password.clone(),
    })
}

/// Normalizes registration data.
/// Password rules beyond length and confirmation are left to the backend.
pub fn validate_registration(data: &RegisterData) -> Result<RegisterData, ValidationError> {
    let username = is_valid_username(&data.username)?;
    let email = is_valid_email(&data.email)?;

    if data.first_name.trim().is_empty() {
        return Err(ValidationError::EmptyField("first_name"));
    }
    if data.last_name.trim().is_empty() {
        return Err(ValidationError::EmptyField("last_name"));
    }

    validate_new_password("password", &data.password, &data.password_confirm)?;

    Ok(RegisterData {
        username,
        email,
        first_name: data.first_name.trim().to_string(),
        last_name: data.last_name.trim().to_string(),
        phone: data
            .phone
            .as_ref()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
        role: data.role,
        password: data.password.clone(),
        password_confirm: data.password_confirm.clone(),
    })
}
