//! Validation error types

use std::fmt;

/// Validation error for request payloads and query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g. email, phone number)
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Value is not one of the accepted variants
    InvalidVariant {
        field: &'static str,
        value: String,
        expected: &'static [&'static str],
    },

    /// Numeric value outside the accepted range
    OutOfRange {
        field: &'static str,
        min: i64,
        max: Option<i64>,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
            Self::InvalidVariant {
                field,
                value,
                expected,
            } => write!(
                f,
                "invalid {} value '{}'. Use: {}",
                field,
                value,
                expected.join(", ")
            ),
            Self::OutOfRange { field, min, max } => match max {
                Some(max) => write!(f, "{} must be between {} and {}", field, min, max),
                None => write!(f, "{} must be greater than or equal to {}", field, min),
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trim a required text field and enforce a maximum length (in characters).
pub fn required_text(
    field: &'static str,
    value: &str,
    max: Option<usize>,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if let Some(max) = max {
        if trimmed.chars().count() > max {
            return Err(ValidationError::TooLong { field, max });
        }
    }
    Ok(trimmed.to_owned())
}

/// Optional text: blank collapses to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
