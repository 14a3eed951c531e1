//! # Identity Domain Entities
//!
//! This module defines the core domain entities for the identity and
//! account-management service. Entities represent persistent business
//! objects that map to the `users` and `temp_tokens` tables.
//!
//! ## Entity Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Domain Entities                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────┐                                                │
//! │  │        User          │  (instance_id, id) unique                     │
//! │  ├─────────────────────┤                                                │
//! │  │ - id (PK)            │                                                │
//! │  │ - instance_id        │                                                │
//! │  │ - account            │──▶ Account{accountId, password, refreshTokens}│
//! │  │ - roles              │──▶ Vec<String>                                │
//! │  │ - profiles           │──▶ Vec<Profile>  (≥1, I2)                     │
//! │  │ - contact_infos      │──▶ Vec<ContactInfo>                           │
//! │  │ - contact_preferences│──▶ ContactPreferences                         │
//! │  │ - timestamps         │                                                │
//! │  └─────────────────────┘                                                │
//! │                                                                         │
//! │  ┌─────────────────────┐                                                │
//! │  │     TempToken        │  (token) PK, purpose-scoped                   │
//! │  └─────────────────────┘                                                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Considerations
//!
//! - **Never expose `account.password`**: use [`UserProfileView`] for API responses.
//! - **Refresh tokens are opaque**: the ring (`account.refresh_tokens`) holds
//!   the raw values the client presents, not hashes — they carry no claims
//!   and are never decoded, only compared for ring membership (C2).
//! - **Temp-tokens are single-purpose**: a token valid for one `purpose` must
//!   never be accepted for another (I4).
//!
//! ## Related Documentation
//!
//! - Database schema: `migrations/0001_initial.sql`
//! - Access tokens: [`shared::auth::jwt`]
//! - Password hashing: [`shared::auth::password`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};
use std::collections::HashMap;
use uuid::Uuid;

// =============================================================================
// USER ENTITY
// =============================================================================

/// Complete user entity as stored in the database (maps to the `users`
/// table). **Never expose this struct directly in API responses** — use
/// [`UserProfileView`] instead.
///
/// The jsonb columns (`account`, `roles`, `profiles`, `contact_infos`,
/// `contact_preferences`) are decoded through [`sqlx::types::Json`] in a
/// hand-written [`FromRow`] impl below, since `#[derive(FromRow)]` has no
/// way to unwrap a `Json<T>` column into a plain `T` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Primary key (UUID v4).
    pub id: Uuid,
    /// Tenant this user belongs to. Every lookup/write is scoped by this
    /// column alongside `id` or `account.account_id` (§9).
    pub instance_id: String,
    /// Primary credential record.
    pub account: Account,
    /// Role strings; unordered set, duplicates forbidden.
    pub roles: Vec<String>,
    /// Non-empty ordered sequence of profiles (I2); the first is the "main"
    /// profile.
    pub profiles: Vec<Profile>,
    /// Contact records (email/phone); at most one marked primary.
    pub contact_infos: Vec<ContactInfo>,
    /// Subscription flags and newsletter target list.
    pub contact_preferences: ContactPreferences,
    /// Epoch seconds of the last successful login.
    pub last_login: i64,
    /// Epoch seconds of the last access-token refresh (§4.5.5).
    pub last_token_refresh: i64,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp, server-stamped on every `updateUser` (C4).
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, PgRow> for User {
    fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            instance_id: row.try_get("instance_id")?,
            account: row.try_get::<Json<Account>, _>("account")?.0,
            roles: row.try_get::<Json<Vec<String>>, _>("roles")?.0,
            profiles: row.try_get::<Json<Vec<Profile>>, _>("profiles")?.0,
            contact_infos: row.try_get::<Json<Vec<ContactInfo>>, _>("contact_infos")?.0,
            contact_preferences: row
                .try_get::<Json<ContactPreferences>, _>("contact_preferences")?
                .0,
            last_login: row.try_get("last_login")?,
            last_token_refresh: row.try_get("last_token_refresh")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl User {
    /// Returns `true` if `role` is present in the user's role set.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Appends `token` to the refresh-token ring, trimming the oldest entry
    /// once length exceeds 10 (I3). Mirrors the original system's
    /// append-then-trim-head idiom.
    pub fn push_refresh_token(&mut self, token: String) {
        self.account.refresh_tokens.push(token);
        while self.account.refresh_tokens.len() > 10 {
            self.account.refresh_tokens.remove(0);
        }
    }

    /// Removes `token` from the refresh-token ring.
    ///
    /// Returns `false` if the token was absent — the caller should treat
    /// this as a possible-replay signal (§4.5.4, §9), not merely a no-op.
    pub fn remove_refresh_token(&mut self, token: &str) -> bool {
        if let Some(pos) = self.account.refresh_tokens.iter().position(|t| t == token) {
            self.account.refresh_tokens.remove(pos);
            true
        } else {
            false
        }
    }

    /// The user's first (main) profile, selected by default on login
    /// (§4.5.1 step 5). Panics only if I2 has been violated elsewhere.
    pub fn default_profile(&self) -> &Profile {
        &self.profiles[0]
    }

    /// IDs of every profile other than `selected`, for the access token's
    /// `otherProfileIds` claim.
    pub fn other_profile_ids(&self, selected: Uuid) -> Vec<Uuid> {
        self.profiles
            .iter()
            .map(|p| p.id)
            .filter(|id| *id != selected)
            .collect()
    }
}

/// The user's primary credential record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Credential type. Only `"email"` is defined; the field is kept
    /// extensible in shape but not in behavior.
    #[serde(rename = "type")]
    pub account_type: String,
    /// The login identifier; globally unique within a tenant (I1);
    /// lowercased and trimmed before storage and lookup (C4).
    pub account_id: String,
    /// Epoch seconds; `0` means unconfirmed (I6).
    pub account_confirmed_at: i64,
    /// Opaque digest produced by the password hasher (C1); never emitted
    /// across any external boundary.
    pub password: String,
    /// Ordered ring of at most 10 opaque refresh-token strings (I3);
    /// oldest evicted on overflow.
    pub refresh_tokens: Vec<String>,
    /// BCP-47-style tag; informational.
    pub preferred_language: String,
}

/// A sub-identity a user may switch between (e.g. self vs. child).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Stable ID, unique within the user.
    pub id: Uuid,
    /// Display alias.
    pub alias: String,
    /// Avatar identifier.
    pub avatar_id: String,
}

/// A contact record (email/phone) attached to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Stable ID, unique within the user.
    pub id: Uuid,
    /// Contact type, e.g. `"email"`.
    #[serde(rename = "type")]
    pub contact_type: String,
    /// The contact address (email address or phone number).
    pub address: String,
    /// Epoch seconds; `0` until verified (I5).
    pub confirmed_at: i64,
}

/// Subscription flags and newsletter target list, mirroring the original
/// system's `ContactPreferences` model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactPreferences {
    /// Whether the user is currently subscribed to the newsletter.
    pub subscribed_to_newsletter: bool,
    /// Additional newsletter target addresses beyond the account's own.
    pub send_newsletter_to: Vec<String>,
}

// =============================================================================
// USER PROFILE VIEW (SAFE FOR API RESPONSES)
// =============================================================================

/// Public user view without sensitive data — returned by `VerifyContact`,
/// `CreateUser`, and anywhere else a `User` crosses the API boundary.
///
/// Excludes `account.password` and the raw refresh-token ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileView {
    pub id: Uuid,
    pub instance_id: String,
    pub account: AccountView,
    pub roles: Vec<String>,
    pub profiles: Vec<Profile>,
    pub contact_infos: Vec<ContactInfo>,
    pub contact_preferences: ContactPreferences,
    pub last_login: i64,
    pub last_token_refresh: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The [`Account`] fields safe to expose externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    #[serde(rename = "type")]
    pub account_type: String,
    pub account_id: String,
    pub account_confirmed_at: i64,
    pub preferred_language: String,
}

impl From<User> for UserProfileView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            instance_id: user.instance_id,
            account: AccountView {
                account_type: user.account.account_type,
                account_id: user.account.account_id,
                account_confirmed_at: user.account.account_confirmed_at,
                preferred_language: user.account.preferred_language,
            },
            roles: user.roles,
            profiles: user.profiles,
            contact_infos: user.contact_infos,
            contact_preferences: user.contact_preferences,
            last_login: user.last_login,
            last_token_refresh: user.last_token_refresh,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// =============================================================================
// TEMP TOKEN ENTITY
// =============================================================================

/// Purpose a [`TempToken`] is valid for (§3). Checked by exact match at the
/// consumer (C3), never at lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TempTokenPurpose {
    ContactVerification,
    PasswordReset,
    SurveyLogin,
    UnsubscribeNewsletter,
    Invitation,
}

impl TempTokenPurpose {
    /// The string stored in the `purpose` column, matching the wire/data
    /// format named in §3.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContactVerification => "contact-verification",
            Self::PasswordReset => "password-reset",
            Self::SurveyLogin => "survey-login",
            Self::UnsubscribeNewsletter => "unsubscribe-newsletter",
            Self::Invitation => "invitation",
        }
    }
}

impl std::fmt::Display for TempTokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single-use, purpose-scoped, expiring credential (§3, C3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TempToken {
    /// Opaque, high-entropy, URL-safe string; primary key.
    pub token: String,
    /// The user this token is bound to.
    pub user_id: Uuid,
    /// The tenant this token is bound to.
    pub instance_id: String,
    /// What this token authorizes (stored as its wire string, e.g.
    /// `"contact-verification"`).
    pub purpose: String,
    /// Small string→string map carrying purpose-specific payload (e.g.
    /// `{type: email, email: x@y}` for verification).
    pub info: HashMap<String, String>,
    /// Absolute expiration, epoch seconds.
    pub expiration: i64,
}

impl FromRow<'_, PgRow> for TempToken {
    fn from_row(row: &PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            token: row.try_get("token")?,
            user_id: row.try_get("user_id")?,
            instance_id: row.try_get("instance_id")?,
            purpose: row.try_get("purpose")?,
            info: row.try_get::<Json<HashMap<String, String>>, _>("info")?.0,
            expiration: row.try_get("expiration")?,
        })
    }
}

impl TempToken {
    /// A temp-token is valid iff its `expiration` is in the future (I4).
    /// Purpose matching is the caller's responsibility.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiration <= now
    }
}

// =============================================================================
// DATA TRANSFER OBJECTS FOR CREATION
// =============================================================================

/// Data required to construct a new [`User`] before it has been persisted.
///
/// `account.password` must already be hashed (C1) — this type never
/// carries a plaintext password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub instance_id: String,
    pub account: Account,
    pub roles: Vec<String>,
    pub profiles: Vec<Profile>,
    pub contact_infos: Vec<ContactInfo>,
    pub contact_preferences: ContactPreferences,
}

/// Data required to construct a new [`TempToken`] before it has been
/// persisted. The token value itself is generated by the store (C3).
#[derive(Debug, Clone)]
pub struct NewTempToken {
    pub user_id: Uuid,
    pub instance_id: String,
    pub purpose: TempTokenPurpose,
    pub info: HashMap<String, String>,
    pub expiration: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account() -> Account {
        Account {
            account_type: "email".to_string(),
            account_id: "user@example.com".to_string(),
            account_confirmed_at: 0,
            password: "hash".to_string(),
            refresh_tokens: vec![],
            preferred_language: "en".to_string(),
        }
    }

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            instance_id: "instance-1".to_string(),
            account: sample_account(),
            roles: vec!["PARTICIPANT".to_string()],
            profiles: vec![Profile {
                id: Uuid::new_v4(),
                alias: "main".to_string(),
                avatar_id: "default".to_string(),
            }],
            contact_infos: vec![],
            contact_preferences: ContactPreferences::default(),
            last_login: 0,
            last_token_refresh: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_push_refresh_token_trims_to_ten() {
        let mut user = sample_user();
        for i in 0..12 {
            user.push_refresh_token(format!("token-{i}"));
        }
        assert_eq!(user.account.refresh_tokens.len(), 10);
        // Oldest two (token-0, token-1) must have been evicted (I3, FIFO).
        assert_eq!(user.account.refresh_tokens[0], "token-2");
        assert_eq!(user.account.refresh_tokens.last().unwrap(), "token-11");
    }

    #[test]
    fn test_remove_refresh_token_found() {
        let mut user = sample_user();
        user.push_refresh_token("rt".to_string());
        assert!(user.remove_refresh_token("rt"));
        assert!(user.account.refresh_tokens.is_empty());
    }

    #[test]
    fn test_remove_refresh_token_not_found_signals_false() {
        let mut user = sample_user();
        assert!(!user.remove_refresh_token("never-issued"));
    }

    #[test]
    fn test_has_role() {
        let user = sample_user();
        assert!(user.has_role("PARTICIPANT"));
        assert!(!user.has_role("ADMIN"));
    }

    #[test]
    fn test_other_profile_ids_excludes_selected() {
        let mut user = sample_user();
        let second = Profile {
            id: Uuid::new_v4(),
            alias: "second".to_string(),
            avatar_id: "default".to_string(),
        };
        user.profiles.push(second.clone());

        let main_id = user.profiles[0].id;
        let others = user.other_profile_ids(main_id);
        assert_eq!(others, vec![second.id]);
    }

    #[test]
    fn test_temp_token_expiry() {
        let token = TempToken {
            token: "tok".to_string(),
            user_id: Uuid::new_v4(),
            instance_id: "instance-1".to_string(),
            purpose: TempTokenPurpose::SurveyLogin.to_string(),
            info: HashMap::new(),
            expiration: 100,
        };
        assert!(token.is_expired(100));
        assert!(token.is_expired(200));
        assert!(!token.is_expired(50));
    }

    #[test]
    fn test_temp_token_purpose_wire_strings() {
        assert_eq!(TempTokenPurpose::ContactVerification.as_str(), "contact-verification");
        assert_eq!(TempTokenPurpose::PasswordReset.as_str(), "password-reset");
        assert_eq!(TempTokenPurpose::SurveyLogin.as_str(), "survey-login");
        assert_eq!(TempTokenPurpose::UnsubscribeNewsletter.as_str(), "unsubscribe-newsletter");
        assert_eq!(TempTokenPurpose::Invitation.as_str(), "invitation");
    }
}
