//! Authentication primitives - password hashing, access tokens, login throttling

pub mod jwt;
pub mod password;
pub mod rate_limit;

pub use jwt::{Claims, Role, TokenIssuer};
pub use password::{hash_password, verify_password};
pub use rate_limit::{RateLimited, RateLimiter};

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Token missing, malformed, expired, or signed with another key
    #[error("could not validate credentials")]
    InvalidToken,

    #[error("token expiry is out of range")]
    ExpiryOutOfRange,

    #[error("token encoding failed: {0}")]
    Token(jsonwebtoken::errors::Error),

    #[error("password hashing failed: {0}")]
    Hash(String),
}
