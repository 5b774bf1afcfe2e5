//! Customer account repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{is_unique_violation, DbError};
use crate::models::Email;

/// User record from database
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new account. A taken email is a `Conflict`.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        full_name: Option<&str>,
        is_active: bool,
    ) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, full_name, is_active, created_at
            "#,
        )
        .bind(email.as_str())
        .bind(password_hash)
        .bind(full_name)
        .bind(is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::Conflict {
                    resource: "user",
                    field: "email",
                }
            } else {
                DbError::Sqlx(e)
            }
        })
    }

    /// Look up an account by email. Emails are stored lowercase.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, full_name, is_active, created_at
            FROM users
            WHERE email = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get(&self, id: i64) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, full_name, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Link guest orders placed with this user's email to the account.
    ///
    /// Returns the number of orders claimed.
    pub async fn claim_orders(&self, user: &User) -> Result<u64, DbError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET user_id = $1
            WHERE user_id IS NULL AND LOWER(email) = LOWER($2)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
