use chrono::NaiveDate;
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

pub const MAX_FULL_NAME_LENGTH: usize = 100;
pub const MAX_MOBILE_LENGTH: usize = 15;
pub const MAX_QUERY_SUBJECT_LENGTH: usize = 100;
pub const MAX_MESSAGE_LENGTH: usize = 500;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactQuery {
    pub id: usize,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub subject: String,
    pub message: String,
    pub date: NaiveDate,
    pub is_read: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContactQuery {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub subject: String,
    pub message: String,
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), String> {
    let length = value.chars().count();
    if length == 0 {
        return Err(format!("{} is required", field));
    }
    if length > max {
        return Err(format!("{} must be at most {} characters", field, max));
    }
    Ok(())
}

impl NewContactQuery {
    /// Returns a trimmed copy, or a message describing the first invalid field.
    pub fn validated(self) -> Result<Self, String> {
        let query = NewContactQuery {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            mobile: self.mobile.trim().to_string(),
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
        };
        check_length("Full name", &query.full_name, MAX_FULL_NAME_LENGTH)?;
        if !EmailAddress::is_valid(&query.email) {
            return Err(format!("'{}' is not a valid email address", query.email));
        }
        check_length("Mobile", &query.mobile, MAX_MOBILE_LENGTH)?;
        check_length("Subject", &query.subject, MAX_QUERY_SUBJECT_LENGTH)?;
        check_length("Message", &query.message, MAX_MESSAGE_LENGTH)?;
        Ok(query)
    }
}
