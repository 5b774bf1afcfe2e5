//! Runtime configuration loaded from environment variables
//!
//! - `ENVIRONMENT`: `development` (default) or anything else for production
//! - `DATABASE_URL`: PostgreSQL connection string
//! - `SECRET_KEY`, `ADMIN_USERNAME`, `ADMIN_PASSWORD`: required in production,
//!   insecure defaults with a warning in development
//! - `ACCESS_TOKEN_EXPIRE_MINUTES`, `JWT_ISSUER`, `JWT_AUDIENCE`: token settings
//! - `CORS_ORIGINS`: comma-separated list of allowed origins
//! - `LOGIN_RATE_LIMIT`, `LOGIN_RATE_WINDOW_SECS`: login throttling

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEV_SECRET_KEY: &str = "insecure-dev-key-DO-NOT-USE-IN-PRODUCTION";
const DEV_ADMIN_USERNAME: &str = "dev_admin";
const DEV_ADMIN_PASSWORD: &str = "dev_password_123";
const DEV_DATABASE_URL: &str = "postgres://localhost/fxsociety";

/// One year
const MAX_TOKEN_MINUTES: i64 = 525_600;
/// One day
const MAX_RATE_WINDOW_SECS: u64 = 86_400;

const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://127.0.0.1:5173",
    "http://localhost:5174",
    "http://127.0.0.1:5174",
    "http://localhost:5175",
    "http://localhost:3000",
];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "missing required configuration for production: {}. Set ENVIRONMENT=development to use insecure local defaults",
        .0.join(", ")
    )]
    Missing(Vec<&'static str>),

    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub database_url: String,
    pub secret_key: String,
    pub admin_username: String,
    pub admin_password: String,
    pub access_token_expire_minutes: i64,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub cors_origins: Vec<String>,
    pub login_rate_limit: usize,
    pub login_rate_window: Duration,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = get("ENVIRONMENT").unwrap_or_else(|| "development".to_string());
        let dev = is_dev_environment(&environment);

        let mut missing = Vec::new();
        let mut required = |key: &'static str, dev_default: &str| match get(key) {
            Some(value) => value,
            None if dev => {
                tracing::warn!("DEV MODE: using insecure default for {key}. Set {key} in production.");
                dev_default.to_string()
            }
            None => {
                missing.push(key);
                String::new()
            }
        };

        let secret_key = required("SECRET_KEY", DEV_SECRET_KEY);
        let admin_username = required("ADMIN_USERNAME", DEV_ADMIN_USERNAME);
        let admin_password = required("ADMIN_PASSWORD", DEV_ADMIN_PASSWORD);
        let database_url = required("DATABASE_URL", DEV_DATABASE_URL);

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let cors_origins = match get("CORS_ORIGINS") {
            Some(raw) => parse_origins(&raw),
            None => DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            environment,
            database_url,
            secret_key,
            admin_username,
            admin_password,
            access_token_expire_minutes: parse_in(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                get("ACCESS_TOKEN_EXPIRE_MINUTES"),
                60 * 24,
                1..=MAX_TOKEN_MINUTES,
            )?,
            jwt_issuer: get("JWT_ISSUER").unwrap_or_else(|| "fxsociety".to_string()),
            jwt_audience: get("JWT_AUDIENCE").unwrap_or_else(|| "fxsociety-client".to_string()),
            cors_origins,
            login_rate_limit: parse_in("LOGIN_RATE_LIMIT", get("LOGIN_RATE_LIMIT"), 5, 1..=usize::MAX)?,
            login_rate_window: Duration::from_secs(parse_in(
                "LOGIN_RATE_WINDOW_SECS",
                get("LOGIN_RATE_WINDOW_SECS"),
                60,
                1..=MAX_RATE_WINDOW_SECS,
            )?),
        })
    }

    /// Whether insecure development defaults are allowed.
    pub fn is_development(&self) -> bool {
        is_dev_environment(&self.environment)
    }
}

fn is_dev_environment(environment: &str) -> bool {
    matches!(environment.to_lowercase().as_str(), "development" | "dev")
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

/// Parse like `parse_or`, then reject values outside `bounds`.
fn parse_in<T>(
    key: &'static str,
    raw: Option<String>,
    default: T,
    bounds: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: FromStr + PartialOrd + fmt::Display,
{
    let value = parse_or(key, raw, default)?;
    if bounds.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn development_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert!(config.is_development());
        assert_eq!(config.admin_username, "dev_admin");
        assert_eq!(config.admin_password, "dev_password_123");
        assert_eq!(config.access_token_expire_minutes, 1440);
        assert_eq!(config.jwt_issuer, "fxsociety");
        assert_eq!(config.jwt_audience, "fxsociety-client");
        assert_eq!(config.login_rate_limit, 5);
        assert_eq!(config.login_rate_window, Duration::from_secs(60));
        assert!(config.cors_origins.contains(&"http://localhost:5173".to_string()));
    }

    #[test]
    fn production_requires_secrets() {
        let err = config_from(&[("ENVIRONMENT", "production")]).unwrap_err();
        match err {
            ConfigError::Missing(keys) => {
                assert_eq!(
                    keys,
                    vec!["SECRET_KEY", "ADMIN_USERNAME", "ADMIN_PASSWORD", "DATABASE_URL"]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn production_with_secrets_loads() {
        let config = config_from(&[
            ("ENVIRONMENT", "production"),
            ("SECRET_KEY", "s3cret"),
            ("ADMIN_USERNAME", "owner"),
            ("ADMIN_PASSWORD", "hunter2"),
            ("DATABASE_URL", "postgres://db/fx"),
            ("CORS_ORIGINS", "https://fxsociety.id, https://admin.fxsociety.id,"),
        ])
        .unwrap();
        assert!(!config.is_development());
        assert_eq!(config.admin_username, "owner");
        assert_eq!(
            config.cors_origins,
            vec!["https://fxsociety.id", "https://admin.fxsociety.id"]
        );
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = config_from(&[("LOGIN_RATE_LIMIT", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LOGIN_RATE_LIMIT", .. }));
    }

    #[test]
    fn token_lifetime_must_be_within_a_year() {
        for raw in ["0", "-5", "525601", "1000000000000"] {
            let err = config_from(&[("ACCESS_TOKEN_EXPIRE_MINUTES", raw)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "ACCESS_TOKEN_EXPIRE_MINUTES", .. }),
                "{raw}"
            );
        }
        let config = config_from(&[("ACCESS_TOKEN_EXPIRE_MINUTES", "525600")]).unwrap();
        assert_eq!(config.access_token_expire_minutes, 525_600);
    }

    #[test]
    fn zero_login_limit_is_rejected() {
        let err = config_from(&[("LOGIN_RATE_LIMIT", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LOGIN_RATE_LIMIT", .. }));
    }

    #[test]
    fn login_window_must_be_positive() {
        let err = config_from(&[("LOGIN_RATE_WINDOW_SECS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LOGIN_RATE_WINDOW_SECS", .. }));

        let err = config_from(&[("LOGIN_RATE_WINDOW_SECS", "86401")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LOGIN_RATE_WINDOW_SECS", .. }));
    }
}
