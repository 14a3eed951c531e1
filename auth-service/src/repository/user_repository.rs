//! # User Repository (C4)
//!
//! Data access layer for the per-tenant user store. Storage is a single
//! `users` table carrying an `instance_id` column as a first-class part of
//! every predicate and the uniqueness index, rather than one physical
//! table per tenant (§4.4) — a single relational database is the concrete
//! datastore chosen for this implementation.
//!
//! The `account`, `roles`, `profiles`, `contact_infos`, and
//! `contact_preferences` columns are `jsonb`; `account_id` is additionally
//! duplicated into its own flat column so the uniqueness index and
//! lookup-by-account-id queries don't need to reach into the document.
//!
//! ## Query Patterns
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Query Patterns                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │ Pattern            │ Example                                            │
//! ├─────────────────────┼───────────────────────────────────────────────────┤
//! │ Tenant scoping     │ WHERE instance_id = $1 AND ...                     │
//! │ Atomic ring push   │ single UPDATE rewriting the jsonb array (§9)       │
//! │ Atomic ring remove │ single UPDATE gated on `? $token` containment      │
//! │ Returning          │ INSERT ... RETURNING * (get generated fields)      │
//! │ Parameterized      │ Always use $1, $2 (never string interpolation)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! | sqlx Error            | ApiError Variant      | HTTP Status |
//! |-----------------------|-----------------------|-------------|
//! | Unique constraint     | `AlreadyExists`       | 409         |
//! | `RowNotFound`         | `NotFound`            | 404         |
//! | Other                 | `Database`            | 500         |
//!
//! ## Related Documentation
//!
//! - Entity definitions: [`crate::domain::entities`]
//! - Database schema: `migrations/0001_initial.sql`
//! - Error types: [`shared::errors::ApiError`]

use chrono::Utc;
use shared::errors::ApiError;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{NewUser, User};

/// Repository for the per-tenant user store (C4).
///
/// # Thread Safety
///
/// `UserRepository` is `Send + Sync` because `PgPool` internally uses `Arc`.
/// It can be safely shared across async tasks and Actix-web workers.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

/// Normalizes an account ID the way every write and lookup must (§4.4):
/// lowercase, then trim, so C5 can never create two users differing only
/// in case or incidental whitespace.
fn normalize_account_id(account_id: &str) -> String {
    account_id.trim().to_lowercase()
}

impl UserRepository {
    /// Creates a new repository instance with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // USER OPERATIONS
    // =========================================================================

    /// Inserts a new user (I1: fails if `(instanceId, accountId)` already
    /// exists). The uniqueness check and insert are atomic via a unique
    /// index, not a separate check-then-insert round trip.
    ///
    /// # Errors
    ///
    /// `ApiError::AlreadyExists` if the `(instance_id, account_id)` pair is
    /// already taken.
    pub async fn add_user(&self, new_user: NewUser) -> Result<User, ApiError> {
        let id = Uuid::new_v4();
        let account_id = normalize_account_id(&new_user.account.account_id);
        let mut account = new_user.account;
        account.account_id = account_id.clone();
        let now = Utc::now();

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, instance_id, account_id, account, roles, profiles,
                contact_infos, contact_preferences, last_login,
                last_token_refresh, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, 0, $9, $9)
            RETURNING id, instance_id, account, roles, profiles,
                      contact_infos, contact_preferences, last_login,
                      last_token_refresh, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&new_user.instance_id)
        .bind(&account_id)
        .bind(Json(&account))
        .bind(Json(&new_user.roles))
        .bind(Json(&new_user.profiles))
        .bind(Json(&new_user.contact_infos))
        .bind(Json(&new_user.contact_preferences))
        .bind(now)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(ApiError::AlreadyExists {
                    resource: format!("account:{account_id}"),
                })
            }
            Err(e) => Err(ApiError::Database(e)),
        }
    }

    /// Looks up a user by normalized account ID, scoped to `instance_id`.
    pub async fn get_by_account_id(
        &self,
        instance_id: &str,
        account_id: &str,
    ) -> Result<Option<User>, ApiError> {
        let normalized = normalize_account_id(account_id);

        sqlx::query_as::<_, User>(
            r#"
            SELECT id, instance_id, account, roles, profiles,
                   contact_infos, contact_preferences, last_login,
                   last_token_refresh, created_at, updated_at
            FROM users
            WHERE instance_id = $1 AND account_id = $2
            "#,
        )
        .bind(instance_id)
        .bind(&normalized)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::Database)
    }

    /// Looks up a user by ID, scoped to `instance_id`.
    pub async fn get_by_id(&self, instance_id: &str, id: Uuid) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, instance_id, account, roles, profiles,
                   contact_infos, contact_preferences, last_login,
                   last_token_refresh, created_at, updated_at
            FROM users
            WHERE instance_id = $1 AND id = $2
            "#,
        )
        .bind(instance_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::Database)
    }

    /// Persists the whole user document (last-write-wins; C4). `updated_at`
    /// is stamped server-side regardless of what the caller set.
    pub async fn update_user(&self, user: &User) -> Result<(), ApiError> {
        let account_id = normalize_account_id(&user.account.account_id);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET account_id = $3,
                account = $4,
                roles = $5,
                profiles = $6,
                contact_infos = $7,
                contact_preferences = $8,
                last_login = $9,
                last_token_refresh = $10,
                updated_at = now()
            WHERE instance_id = $1 AND id = $2
            "#,
        )
        .bind(&user.instance_id)
        .bind(user.id)
        .bind(&account_id)
        .bind(Json(&user.account))
        .bind(Json(&user.roles))
        .bind(Json(&user.profiles))
        .bind(Json(&user.contact_infos))
        .bind(Json(&user.contact_preferences))
        .bind(user.last_login)
        .bind(user.last_token_refresh)
        .execute(&self.pool)
        .await
        .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: format!("user:{}", user.id),
            });
        }

        Ok(())
    }

    // =========================================================================
    // REFRESH TOKEN RING OPERATIONS (§9)
    // =========================================================================

    /// Atomically appends `token` to the user's refresh-token ring, trimming
    /// the oldest entries while length exceeds 10 (I3). Implemented as a
    /// single `UPDATE` so the append-then-trim can never race with a
    /// concurrent push or remove on the same user (§9).
    pub async fn push_refresh_token(
        &self,
        instance_id: &str,
        user_id: Uuid,
        token: &str,
    ) -> Result<(), ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET account = jsonb_set(
                    account,
                    '{refresh_tokens}',
                    (
                        SELECT COALESCE(jsonb_agg(elem ORDER BY ord), '[]'::jsonb)
                        FROM (
                            SELECT elem, ord
                            FROM jsonb_array_elements_text(
                                     (account->'refresh_tokens') || to_jsonb($3::text)
                                 ) WITH ORDINALITY AS x(elem, ord)
                            ORDER BY ord DESC
                            LIMIT 10
                        ) recent
                    )
                ),
                updated_at = now()
            WHERE instance_id = $1 AND id = $2
            "#,
        )
        .bind(instance_id)
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: format!("user:{user_id}"),
            });
        }

        Ok(())
    }

    /// Atomically removes `token` from the user's refresh-token ring.
    ///
    /// Returns `false` if the token was not present — the caller (C5) must
    /// treat this as a possible-replay signal, not a plain no-op (§4.5.4).
    pub async fn remove_refresh_token(
        &self,
        instance_id: &str,
        user_id: Uuid,
        token: &str,
    ) -> Result<bool, ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET account = jsonb_set(
                    account,
                    '{refresh_tokens}',
                    (
                        SELECT COALESCE(jsonb_agg(elem ORDER BY ord), '[]'::jsonb)
                        FROM jsonb_array_elements_text(account->'refresh_tokens')
                             WITH ORDINALITY AS x(elem, ord)
                        WHERE elem <> $3
                    )
                ),
                updated_at = now()
            WHERE instance_id = $1 AND id = $2
              AND account->'refresh_tokens' ? $3
            "#,
        )
        .bind(instance_id)
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(ApiError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Clears the refresh-token ring entirely — used by `ChangePassword`
    /// and `ResetPassword` (§4.5.7, §4.6.1) to force every other session to
    /// re-authenticate.
    pub async fn clear_refresh_tokens(
        &self,
        instance_id: &str,
        user_id: Uuid,
    ) -> Result<(), ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET account = jsonb_set(account, '{refresh_tokens}', '[]'::jsonb),
                updated_at = now()
            WHERE instance_id = $1 AND id = $2
            "#,
        )
        .bind(instance_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: format!("user:{user_id}"),
            });
        }

        Ok(())
    }

    // =========================================================================
    // TIMESTAMP OPERATIONS
    // =========================================================================

    /// Stamps `last_login` to the given epoch-seconds value.
    pub async fn update_last_login(
        &self,
        instance_id: &str,
        user_id: Uuid,
        at: i64,
    ) -> Result<(), ApiError> {
        sqlx::query(
            "UPDATE users SET last_login = $3, updated_at = now() WHERE instance_id = $1 AND id = $2",
        )
        .bind(instance_id)
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(ApiError::Database)?;

        Ok(())
    }

    /// Stamps `last_token_refresh` to the given epoch-seconds value (used by
    /// §4.5.5's `tokenMinimumAge` check).
    pub async fn update_last_token_refresh(
        &self,
        instance_id: &str,
        user_id: Uuid,
        at: i64,
    ) -> Result<(), ApiError> {
        sqlx::query(
            "UPDATE users SET last_token_refresh = $3, updated_at = now() WHERE instance_id = $1 AND id = $2",
        )
        .bind(instance_id)
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(ApiError::Database)?;

        Ok(())
    }

    // =========================================================================
    // DELETION (§4.5.8)
    // =========================================================================

    /// Removes the user document entirely. Idempotent per-call: deleting an
    /// already-absent user returns `NotFound` rather than silently
    /// succeeding, so callers can distinguish "already gone" at the RPC
    /// layer if they need to.
    pub async fn delete_user(&self, instance_id: &str, user_id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE instance_id = $1 AND id = $2")
            .bind(instance_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound {
                resource: format!("user:{user_id}"),
            });
        }

        Ok(())
    }

    // =========================================================================
    // ADMIN QUERIES (C7)
    // =========================================================================

    /// Lists users in `instance_id` whose role set is not exactly
    /// `{PARTICIPANT}` (§4.7) — staff/admin accounts, for audit tooling.
    pub async fn find_non_participant_users(
        &self,
        instance_id: &str,
    ) -> Result<Vec<User>, ApiError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, instance_id, account, roles, profiles,
                   contact_infos, contact_preferences, last_login,
                   last_token_refresh, created_at, updated_at
            FROM users
            WHERE instance_id = $1
              AND NOT (roles @> '["PARTICIPANT"]'::jsonb AND jsonb_array_length(roles) = 1)
            ORDER BY created_at
            "#,
        )
        .bind(instance_id)
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::Database)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Account, ContactInfo, ContactPreferences, Profile};

    // Note: These tests require a test database.
    // Use sqlx's test fixtures or testcontainers for integration tests.

    #[test]
    fn test_new_user_struct() {
        let new_user = NewUser {
            instance_id: "instance-1".to_string(),
            account: Account {
                account_type: "email".to_string(),
                account_id: "test@example.com".to_string(),
                account_confirmed_at: 0,
                password: "$argon2id$...".to_string(),
                refresh_tokens: Vec::new(),
                preferred_language: "en".to_string(),
            },
            roles: vec!["PARTICIPANT".to_string()],
            profiles: vec![Profile {
                id: Uuid::new_v4(),
                alias: "test@example.com".to_string(),
                avatar_id: String::new(),
            }],
            contact_infos: vec![ContactInfo {
                id: Uuid::new_v4(),
                contact_type: "email".to_string(),
                address: "test@example.com".to_string(),
                confirmed_at: 0,
            }],
            contact_preferences: ContactPreferences::default(),
        };

        assert_eq!(new_user.instance_id, "instance-1");
        assert_eq!(new_user.account.account_id, "test@example.com");
        assert_eq!(new_user.roles, vec!["PARTICIPANT".to_string()]);
    }

    #[test]
    fn test_normalize_account_id_lowercases_and_trims() {
        assert_eq!(normalize_account_id("  Test@Example.COM  "), "test@example.com");
    }
}
