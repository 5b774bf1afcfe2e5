//! Support ticket models

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::validation::required_text;
use super::ValidationError;

const MAX_TITLE_LEN: usize = 200;

/// Ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    Answered,
    Closed,
}

impl TicketStatus {
    pub const ALL: &'static [&'static str] = &["open", "answered", "closed"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Answered => "answered",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "answered" => Ok(Self::Answered),
            "closed" => Ok(Self::Closed),
            other => Err(ValidationError::InvalidVariant {
                field: "status",
                value: other.to_owned(),
                expected: Self::ALL,
            }),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create ticket request
#[derive(Debug, Clone, Deserialize)]
pub struct TicketCreate {
    pub title: String,
    pub message: String,
}

/// Validated ticket
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub message: String,
}

impl TicketCreate {
    pub fn validate(self) -> Result<NewTicket, ValidationError> {
        Ok(NewTicket {
            title: required_text("title", &self.title, Some(MAX_TITLE_LEN))?,
            message: required_text("message", &self.message, None)?,
        })
    }
}
