//! Admin CRM models - customer tags, notes, and listing filters

use serde::Deserialize;

use super::validation::required_text;
use super::ValidationError;

const MAX_TAG_LEN: usize = 50;

/// Tag counted by the dashboard's "follow up needed" tile
pub const FOLLOW_UP_TAG: &str = "Follow Up";

/// Validated customer tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagName(String);

impl TagName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text("tag", s, Some(MAX_TAG_LEN)).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated note body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteText(String);

impl NoteText {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        required_text("note", s, None).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagCreate {
    pub tag: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteCreate {
    pub note: String,
}

/// Customer list ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CustomerSort {
    #[default]
    Newest,
    Spend,
    Orders,
    Activity,
}

impl CustomerSort {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("spend") => Self::Spend,
            Some("orders") => Self::Orders,
            Some("activity") => Self::Activity,
            _ => Self::Newest,
        }
    }

    /// ORDER BY clause over the customer summary columns.
    pub fn order_clause(self) -> &'static str {
        match self {
            Self::Newest => "created_at DESC, id DESC",
            Self::Spend => "total_spend DESC, id DESC",
            Self::Orders => "total_orders DESC, id DESC",
            Self::Activity => "last_activity DESC, id DESC",
        }
    }
}

/// Customer list filters
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub sort: CustomerSort,
}
