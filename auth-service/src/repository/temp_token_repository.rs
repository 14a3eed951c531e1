//! # Temp-Token Repository (C3)
//!
//! Data access layer for single-use, purpose-scoped, expiring credentials
//! shared across all tenants in one table (each record carries its own
//! `instance_id`, per §6's persisted-layout note).
//!
//! Unlike [`crate::repository::user_repository::UserRepository`], which has
//! a direct teacher ancestor, this store has no equivalent in the teacher
//! repo — the teacher kept a single verification token as two columns on
//! `users`. It's grounded on the same repository-struct shape and error
//! mapping the teacher uses, generalized to a second, purpose-scoped table.
//!
//! ## Related Documentation
//!
//! - Entity definition: [`crate::domain::entities::TempToken`]
//! - Database schema: `migrations/0001_initial.sql`

use chrono::Utc;
use shared::auth::generate_opaque_token;
use shared::errors::ApiError;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{NewTempToken, TempToken};

/// Repository for the temp-token store (C3).
#[derive(Debug, Clone)]
pub struct TempTokenRepository {
    pool: PgPool,
}

impl TempTokenRepository {
    /// Creates a new repository instance with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Generates a 128-bit opaque token value and persists a new record
    /// bound to it. Returns the token value the caller must hand to the
    /// requester (e.g. embed in a verification email link).
    pub async fn add(&self, new_token: NewTempToken) -> Result<String, ApiError> {
        let token = generate_opaque_token(16);

        sqlx::query(
            r#"
            INSERT INTO temp_tokens (token, user_id, instance_id, purpose, info, expiration)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&token)
        .bind(new_token.user_id)
        .bind(&new_token.instance_id)
        .bind(new_token.purpose.as_str())
        .bind(Json(&new_token.info))
        .bind(new_token.expiration)
        .execute(&self.pool)
        .await
        .map_err(ApiError::Database)?;

        Ok(token)
    }

    /// Looks up a temp-token by its value. Does not check expiry or
    /// purpose — that's the consumer's responsibility (I4).
    pub async fn get_by_token(&self, token: &str) -> Result<Option<TempToken>, ApiError> {
        sqlx::query_as::<_, TempToken>(
            "SELECT token, user_id, instance_id, purpose, info, expiration FROM temp_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::Database)
    }

    /// Deletes a temp-token by value (single-use consumption).
    pub async fn delete_by_token(&self, token: &str) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM temp_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(ApiError::Database)?;

        Ok(())
    }

    /// Deletes every temp-token bound to a user, optionally restricted to a
    /// single purpose (e.g. invalidating stale password-reset links after a
    /// successful reset).
    pub async fn delete_all_of_user(
        &self,
        user_id: Uuid,
        purpose: Option<&str>,
    ) -> Result<(), ApiError> {
        match purpose {
            Some(purpose) => {
                sqlx::query("DELETE FROM temp_tokens WHERE user_id = $1 AND purpose = $2")
                    .bind(user_id)
                    .bind(purpose)
                    .execute(&self.pool)
                    .await
            }
            None => {
                sqlx::query("DELETE FROM temp_tokens WHERE user_id = $1")
                    .bind(user_id)
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(ApiError::Database)?;

        Ok(())
    }

    /// Periodic housekeeping: removes every token whose expiration has
    /// passed. Safe to call repeatedly from a background sweep.
    pub async fn purge_expired(&self) -> Result<u64, ApiError> {
        let now = Utc::now().timestamp();

        let result = sqlx::query("DELETE FROM temp_tokens WHERE expiration <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(ApiError::Database)?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::TempTokenPurpose;
    use std::collections::HashMap;

    // Note: These tests require a test database.
    // Use sqlx's test fixtures or testcontainers for integration tests.

    #[test]
    fn test_new_temp_token_struct() {
        let new_token = NewTempToken {
            user_id: Uuid::new_v4(),
            instance_id: "instance-1".to_string(),
            purpose: TempTokenPurpose::PasswordReset,
            info: HashMap::new(),
            expiration: Utc::now().timestamp() + 3_600,
        };

        assert_eq!(new_token.instance_id, "instance-1");
        assert_eq!(new_token.purpose.as_str(), "password-reset");
    }
}
