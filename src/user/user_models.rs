use super::UserRole;
use crate::document::Branch;
use chrono::{DateTime, Utc};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

pub const MAX_NAME_LENGTH: usize = 30;
pub const CONTACT_DIGITS: usize = 10;
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: usize,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub contact: String,
    pub branch: Branch,
    pub role: UserRole,
    pub created: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub contact: String,
    pub branch: Branch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub contact: String,
    pub branch: Branch,
}

/// Trims and lowercases an email, rejecting malformed addresses.
pub fn normalize_email(raw: &str) -> Result<String, String> {
    let email = raw.trim().to_lowercase();
    if !EmailAddress::is_valid(&email) {
        return Err(format!("'{}' is not a valid email address", raw.trim()));
    }
    Ok(email)
}

pub fn validate_name(field: &str, value: &str) -> Result<(), String> {
    let length = value.trim().chars().count();
    if length == 0 {
        return Err(format!("{} is required", field));
    }
    if length > MAX_NAME_LENGTH {
        return Err(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_contact(contact: &str) -> Result<(), String> {
    if contact.len() != CONTACT_DIGITS || !contact.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("Contact must be exactly {} digits", CONTACT_DIGITS));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_emails() {
        assert_eq!(
            normalize_email("  Ada@Uni.EDU ").unwrap(),
            "ada@uni.edu".to_string()
        );
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("").is_err());
    }

    #[test]
    fn contact_must_be_ten_digits() {
        assert!(validate_contact("0123456789").is_ok());
        assert!(validate_contact("012345678").is_err());
        assert!(validate_contact("01234567890").is_err());
        assert!(validate_contact("01234abcde").is_err());
    }

    #[test]
    fn names_are_bounded() {
        assert!(validate_name("First name", "Ada").is_ok());
        assert!(validate_name("First name", "   ").is_err());
        assert!(validate_name("First name", &"x".repeat(31)).is_err());
    }

    #[test]
    fn passwords_have_minimum_length() {
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("1234567").is_err());
    }
}
