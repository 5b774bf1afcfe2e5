//! Customer accounts

use serde::Deserialize;

use super::validation::optional_text;
use super::{Email, ValidationError};

const MIN_PASSWORD_LEN: usize = 1;
const MAX_FULL_NAME_LEN: usize = 255;

/// Registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

/// Validated registration (password still in plain text, hashed by the caller)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password: String,
    pub full_name: Option<String>,
    pub is_active: bool,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewUser, ValidationError> {
        let email = Email::new(&self.email)?;

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::Empty { field: "password" });
        }

        let full_name = optional_text(self.full_name);
        if let Some(name) = &full_name {
            if name.chars().count() > MAX_FULL_NAME_LEN {
                return Err(ValidationError::TooLong {
                    field: "full_name",
                    max: MAX_FULL_NAME_LEN,
                });
            }
        }

        Ok(NewUser {
            email,
            password: self.password,
            full_name,
            is_active: self.is_active.unwrap_or(true),
        })
    }
}

/// Login form (`username` carries the email for customers)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
