//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Handles conflicts via unique constraints (no check-then-insert)
//! - Uses transactions when a mutation also writes an activity entry

pub mod activity;
pub mod crm;
pub mod orders;
pub mod products;
pub mod tickets;
pub mod users;

pub use activity::{log_activity, ActivityLog};
pub use crm::{CrmRepo, CustomerNote, CustomerSummary, CustomerTag, DashboardStats};
pub use orders::{Order, OrderRepo, OrderWithProduct, PublicOrderStatus};
pub use products::{Product, ProductRepo};
pub use tickets::{Ticket, TicketRepo};
pub use users::{User, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// A unique constraint rejected the write
    #[error("conflict on {resource}: {field} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
    },
}

/// True when the error is a unique-constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Build a case-insensitive substring pattern for `ILIKE`, escaping wildcards.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// `ILIKE` pattern for a trimmed search term, or `None` when blank.
pub(crate) fn search_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(contains_pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_wraps_term() {
        assert_eq!(contains_pattern("scalper"), "%scalper%");
    }

    #[test]
    fn pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(search_term(None), None);
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(Some(" ea ")), Some("%ea%".to_string()));
    }
}
