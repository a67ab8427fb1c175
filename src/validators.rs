/// Registration input validators
///
/// Checks run in field order (name, email, password) and the first failure
/// is reported. Nothing here touches the store or the hasher.

use regex::Regex;
use lazy_static::lazy_static;

use crate::error::ValidationError;

const MIN_NAME_LENGTH: usize = 3;
const MAX_NAME_LENGTH: usize = 256;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_PASSWORD_LENGTH: usize = 8;
// bcrypt ignores everything past 72 bytes, so longer passwords are refused
const MAX_PASSWORD_BYTES: usize = 72;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$"
    ).unwrap();
}

/// Validated registration input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccountInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Validates a registration request, short-circuiting on the first bad field.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
) -> Result<NewAccountInput, ValidationError> {
    let name = is_valid_name(name)?;
    let email = is_valid_email(email)?;
    is_valid_password(password)?;

    Ok(NewAccountInput {
        name,
        email,
        password: password.to_string(),
    })
}

/// Validates a display name; surrounding whitespace is trimmed.
pub fn is_valid_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();

    if trimmed.chars().count() < MIN_NAME_LENGTH {
        return Err(ValidationError::TooShort("Name", MIN_NAME_LENGTH));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong("Name", MAX_NAME_LENGTH));
    }

    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::SuspiciousContent("Name"));
    }

    Ok(trimmed.to_string())
}

/// Validates an email address; surrounding whitespace is trimmed, case is kept.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat("Email"));
    }

    // Local part is limited to 64 octets
    if let Some(at_pos) = trimmed.find('@') {
        if at_pos > 64 {
            return Err(ValidationError::InvalidFormat("Email"));
        }
    }

    Ok(trimmed.to_string())
}

/// Validates password length only; the password is never trimmed.
///
/// The lower bound counts characters, the upper bound counts UTF-8 bytes.
pub fn is_valid_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort("Password", MIN_PASSWORD_LENGTH));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooLong("Password", MAX_PASSWORD_BYTES));
    }

    Ok(())
}
