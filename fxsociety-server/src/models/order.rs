//! Order models and status lifecycle

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::validation::{optional_text, required_text};
use super::{Email, ValidationError, WhatsApp};

const MAX_NAME_LEN: usize = 200;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: &'static [&'static str] = &["pending", "confirmed", "completed", "cancelled"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ValidationError::InvalidVariant {
                field: "status",
                value: other.to_owned(),
                expected: Self::ALL,
            }),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse an optional `status` list filter where `all` (or nothing) means no filter.
pub fn status_filter<T: FromStr<Err = ValidationError>>(
    raw: Option<&str>,
) -> Result<Option<T>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

/// Create order request (public checkout form)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    pub product_id: i64,
    pub name: String,
    pub email: String,
    pub whatsapp: String,
    pub notes: Option<String>,
}

/// Validated order, not yet assigned an order code
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub product_id: i64,
    pub name: String,
    pub email: Email,
    pub whatsapp: WhatsApp,
    pub notes: Option<String>,
}

impl OrderCreate {
    pub fn validate(self) -> Result<NewOrder, ValidationError> {
        if self.product_id < 1 {
            return Err(ValidationError::OutOfRange {
                field: "product_id",
                min: 1,
                max: None,
            });
        }
        Ok(NewOrder {
            product_id: self.product_id,
            name: required_text("name", &self.name, Some(MAX_NAME_LEN))?,
            email: Email::new(&self.email)?,
            whatsapp: WhatsApp::new(&self.whatsapp)?,
            notes: optional_text(self.notes),
        })
    }
}

/// Admin status change request
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}
