//! HS256 access tokens
//!
//! Tokens carry `sub` (admin username or customer email), `role`, and the
//! standard `exp`/`iat`/`iss`/`aud` claims. Verification checks the signature,
//! expiry, issuer, and audience.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::AppConfig;

/// Token role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

/// Issues and verifies access tokens with a shared secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, issuer: &str, audience: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_owned(),
            audience: audience.to_owned(),
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.secret_key,
            &config.jwt_issuer,
            &config.jwt_audience,
            Duration::minutes(config.access_token_expire_minutes),
        )
    }

    /// Issue a signed token for `subject` with the given role.
    pub fn issue(&self, subject: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or(AuthError::ExpiryOutOfRange)?;
        let claims = Claims {
            sub: subject.to_owned(),
            role,
            exp: expires.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(AuthError::Token)
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("token rejected: {}", e);
                AuthError::InvalidToken
            })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", "fxsociety", "fxsociety-client", Duration::minutes(30))
    }

    #[test]
    fn round_trip() {
        let tokens = issuer();
        let token = tokens.issue("budi@example.com", Role::User).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "budi@example.com");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.iss, "fxsociety");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issuer().issue("dev_admin", Role::Admin).unwrap();
        let other = TokenIssuer::new("other", "fxsociety", "fxsociety-client", Duration::minutes(30));
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn wrong_audience_rejected() {
        let token = issuer().issue("dev_admin", Role::Admin).unwrap();
        let other = TokenIssuer::new("test-secret", "fxsociety", "someone-else", Duration::minutes(30));
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn wrong_issuer_rejected() {
        let token = issuer().issue("dev_admin", Role::Admin).unwrap();
        let other = TokenIssuer::new("test-secret", "elsewhere", "fxsociety-client", Duration::minutes(30));
        assert!(matches!(other.verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn expired_token_rejected() {
        // beyond the default 60s leeway
        let expired = TokenIssuer::new("test-secret", "fxsociety", "fxsociety-client", Duration::minutes(-10));
        let token = expired.issue("budi@example.com", Role::User).unwrap();
        assert!(matches!(issuer().verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let tokens = TokenIssuer::new(
            "test-secret",
            "fxsociety",
            "fxsociety-client",
            Duration::days(100_000_000),
        );
        assert!(matches!(
            tokens.issue("dev_admin", Role::Admin),
            Err(AuthError::ExpiryOutOfRange)
        ));
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(issuer().verify("not.a.token"), Err(AuthError::InvalidToken)));
    }
}
