//! # Authentication Service
//!
//! Core business logic for the login/signup/token lifecycle: password
//! login, temp-token login, signup, profile switching, token refresh,
//! logout, password change, and account deletion.
//!
//! ## Security Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Token Architecture                              │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐                      ┌─────────────────────────┐   │
//! │  │  Access Token   │                      │    Refresh Token        │   │
//! │  │  (JWT, short)   │                      │    (Opaque, ring of 10) │   │
//! │  └────────┬────────┘                      └───────────┬─────────────┘   │
//! │           │                                           │                 │
//! │           │ Stateless, carries roles +                │ Stateful,       │
//! │           │ selectedProfileId in claims                │ revocable via   │
//! │           ▼                                           ▼ database lookup │
//! │  ┌─────────────────┐                      ┌─────────────────────────┐   │
//! │  │ Verified offline│                      │ Rotation = theft        │   │
//! │  │ via signature   │                      │ detection primitive     │   │
//! │  └─────────────────┘                      └─────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Anti-enumeration
//!
//! Wrong-email and wrong-password both return
//! [`ApiError::InvalidCredentials`] with a dummy hash verification on the
//! miss path, so the timing of a nonexistent account approximates a real
//! one. Signup conflicts still dispatch the confirmation email to the
//! existing account without differentiating the error by code.
//!
//! ## Related Documentation
//!
//! - JWT configuration: [`shared::auth::jwt::JwtService`]
//! - Password security: [`shared::auth::password::PasswordHasher`]
//! - Messaging collaborator: [`crate::service::messaging_client::MessagingClient`]

use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{
    auth::{
        jwt::JwtService, middleware::AuthenticatedUser, password::PasswordHasher,
        password::PasswordPolicy, token::generate_opaque_token,
    },
    config::{PasswordPolicyConfig, TempTokenConfig},
    errors::ApiError,
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::domain::entities::{
    Account, ContactInfo, ContactPreferences, NewTempToken, NewUser, Profile, TempTokenPurpose,
    User,
};
use crate::domain::events::{DomainEvent, PasswordChanged, ProfileSwitched, UserLoggedIn, UserRegistered};
use crate::repository::{TempTokenRepository, UserRepository};
use crate::service::messaging_client::MessagingClient;

// =============================================================================
// RESPONSE SHAPE
// =============================================================================

/// The token pair returned by every login/refresh-style RPC (§6).
///
/// `refresh_token` is `None` for `LoginWithTempToken` (§4.5.2) — that flow
/// is a one-shot cross-service hand-off and never issues one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub selected_profile_id: Uuid,
    pub profiles: Vec<Profile>,
    pub preferred_language: String,
    pub account_confirmed: bool,
}

// =============================================================================
// SERVICE STRUCT
// =============================================================================

/// Authentication service orchestrating the password hasher, token codec,
/// user store, and messaging collaborator for every login/signup/session
/// operation.
///
/// # Thread Safety
///
/// `Clone`-able and safe to share across Actix-web workers: every field is
/// either already cheaply cloneable (`PgPool`-backed repositories) or held
/// behind an `Arc`.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    temp_token_repo: TempTokenRepository,
    jwt_service: Arc<JwtService>,
    password_hasher: PasswordHasher,
    messaging: Arc<MessagingClient>,
    password_policy: PasswordPolicyConfig,
    temp_token_config: TempTokenConfig,
    /// Hash of a fixed dummy password, computed once so the miss-path of
    /// `login_with_email` can run a real Argon2id verification and keep its
    /// timing close to the hit path (P6).
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        temp_token_repo: TempTokenRepository,
        jwt_service: Arc<JwtService>,
        password_hasher: PasswordHasher,
        messaging: Arc<MessagingClient>,
        password_policy: PasswordPolicyConfig,
        temp_token_config: TempTokenConfig,
    ) -> Self {
        let dummy_hash = password_hasher
            .hash("dummy-password-for-timing-00")
            .expect("dummy hash computation cannot fail");

        Self {
            user_repo,
            temp_token_repo,
            jwt_service,
            password_hasher,
            messaging,
            password_policy,
            temp_token_config,
            dummy_hash,
        }
    }

    // =========================================================================
    // LOGIN (4.5.1)
    // =========================================================================

    /// Password login. `as_participant` denies staff accounts from
    /// obtaining a token meant for the participant-facing UI.
    pub async fn login_with_email(
        &self,
        instance_id: &str,
        email: &str,
        password: &str,
        as_participant: bool,
    ) -> Result<TokenPair, ApiError> {
        let user = match self.user_repo.get_by_account_id(instance_id, email).await? {
            Some(user) => user,
            None => {
                // Dummy verify to approximate the hit-path timing (P6).
                let _ = self.password_hasher.verify(password, &self.dummy_hash);
                return Err(ApiError::InvalidCredentials);
            }
        };

        if !self.password_hasher.verify(password, &user.account.password)? {
            return Err(ApiError::InvalidCredentials);
        }

        if as_participant && !user.has_role("PARTICIPANT") {
            return Err(ApiError::InvalidCredentials);
        }

        self.issue_session(user, "password").await
    }

    /// Temp-token login (magic link / survey hand-off, 4.5.2). Mints an
    /// access token only; no refresh token is ever issued for this flow.
    pub async fn login_with_temp_token(&self, token: &str) -> Result<TokenPair, ApiError> {
        let temp_token = self
            .temp_token_repo
            .get_by_token(token)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        if temp_token.purpose != TempTokenPurpose::SurveyLogin.as_str() {
            return Err(ApiError::InvalidToken);
        }

        if temp_token.is_expired(Utc::now().timestamp()) {
            return Err(ApiError::InvalidToken);
        }

        let user = self
            .user_repo
            .get_by_id(&temp_token.instance_id, temp_token.user_id)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        let profile = user.default_profile();
        let other_profile_ids = user.other_profile_ids(profile.id);
        let account_confirmed = user.account.account_confirmed_at > 0;

        let access_token = self.jwt_service.generate_access_token(
            user.id,
            &user.instance_id,
            &user.roles,
            profile.id,
            &other_profile_ids,
            account_confirmed,
        )?;

        self.log_login(&user, "temp-token");

        Ok(TokenPair {
            access_token,
            refresh_token: None,
            selected_profile_id: profile.id,
            profiles: user.profiles,
            preferred_language: user.account.preferred_language,
            account_confirmed,
        })
    }

    // =========================================================================
    // SIGNUP (4.5.3)
    // =========================================================================

    /// Email/password signup. Returns tokens on success; on a uniqueness
    /// conflict, still dispatches the verification email to the existing
    /// account (anti-enumeration) before surfacing the conflict error.
    pub async fn signup_with_email(
        &self,
        instance_id: &str,
        email: &str,
        password: &str,
        preferred_language: &str,
    ) -> Result<TokenPair, ApiError> {
        let normalized_email = email.trim().to_lowercase();

        if !normalized_email.validate_email() {
            return Err(ApiError::EmailNotValid);
        }

        PasswordPolicy::validate_with_config(password, &self.password_policy)
            .map_err(|_| ApiError::PasswordTooWeak)?;

        let password_hash = self.password_hasher.hash(password)?;
        let profile_id = Uuid::new_v4();
        let contact_info_id = Uuid::new_v4();

        let new_user = NewUser {
            instance_id: instance_id.to_string(),
            account: Account {
                account_type: "email".to_string(),
                account_id: normalized_email.clone(),
                account_confirmed_at: 0,
                password: password_hash,
                refresh_tokens: Vec::new(),
                preferred_language: preferred_language.to_string(),
            },
            roles: vec!["PARTICIPANT".to_string()],
            profiles: vec![Profile {
                id: profile_id,
                alias: normalized_email.clone(),
                avatar_id: String::new(),
            }],
            contact_infos: vec![ContactInfo {
                id: contact_info_id,
                contact_type: "email".to_string(),
                address: normalized_email.clone(),
                confirmed_at: 0,
            }],
            contact_preferences: ContactPreferences::default(),
        };

        let user = match self.user_repo.add_user(new_user).await {
            Ok(user) => user,
            Err(ApiError::AlreadyExists { resource }) => {
                if let Ok(Some(existing)) =
                    self.user_repo.get_by_account_id(instance_id, &normalized_email).await
                {
                    self.issue_and_send_verification(&existing).await;
                }
                return Err(ApiError::AlreadyExists { resource });
            }
            Err(e) => return Err(e),
        };

        self.issue_and_send_verification(&user).await;

        let event = UserRegistered {
            user_id: user.id,
            instance_id: user.instance_id.clone(),
            account_id: user.account.account_id.clone(),
            roles: user.roles.clone(),
            via_admin: false,
            occurred_at: Utc::now(),
        };
        info!(event = event.event_type(), user_id = %user.id, "user registered via signup");

        self.issue_session(user, "password").await
    }

    /// Issues a `contact-verification` temp-token for the user's primary
    /// contact and dispatches the confirmation email. Failures are logged
    /// by the messaging client and never propagated (§7).
    async fn issue_and_send_verification(&self, user: &User) {
        let Some(contact) = user.contact_infos.first() else {
            return;
        };

        let mut info = std::collections::HashMap::new();
        info.insert("type".to_string(), contact.contact_type.clone());
        info.insert("email".to_string(), contact.address.clone());

        let new_token = NewTempToken {
            user_id: user.id,
            instance_id: user.instance_id.clone(),
            purpose: TempTokenPurpose::ContactVerification,
            info,
            expiration: Utc::now().timestamp() + self.temp_token_config.contact_verification_seconds,
        };

        match self.temp_token_repo.add(new_token).await {
            Ok(token) => {
                self.messaging.send_confirmation_email(&contact.address, &token).await;
            }
            Err(error) => {
                tracing::warn!(%error, user_id = %user.id, "failed to issue verification temp-token");
            }
        }
    }

    // =========================================================================
    // PROFILE SWITCH (4.5.4)
    // =========================================================================

    /// Switches the session's active profile, rotating the refresh token in
    /// the process. The rotation is what makes a stolen-then-reused refresh
    /// token detectable — the legitimate client's next rotation will miss.
    pub async fn switch_profile(
        &self,
        auth: &AuthenticatedUser,
        profile_id: Uuid,
        current_refresh_token: &str,
    ) -> Result<TokenPair, ApiError> {
        let user = self
            .user_repo
            .get_by_id(&auth.instance_id, auth.user_id)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        if !user.profiles.iter().any(|p| p.id == profile_id) {
            return Err(ApiError::ProfileNotFound);
        }

        let removed = self
            .user_repo
            .remove_refresh_token(&auth.instance_id, auth.user_id, current_refresh_token)
            .await?;
        if !removed {
            return Err(ApiError::InvalidToken);
        }

        let new_refresh_token = generate_opaque_token(16);
        self.user_repo
            .push_refresh_token(&auth.instance_id, auth.user_id, &new_refresh_token)
            .await?;

        let other_profile_ids = user.other_profile_ids(profile_id);
        let account_confirmed = user.account.account_confirmed_at > 0;

        let access_token = self.jwt_service.generate_access_token(
            user.id,
            &user.instance_id,
            &user.roles,
            profile_id,
            &other_profile_ids,
            account_confirmed,
        )?;

        let event = ProfileSwitched {
            user_id: user.id,
            instance_id: user.instance_id.clone(),
            previous_profile_id: Some(auth.selected_profile_id),
            new_profile_id: profile_id,
            occurred_at: Utc::now(),
        };
        info!(event = event.event_type(), user_id = %user.id, "profile switched");

        Ok(TokenPair {
            access_token,
            refresh_token: Some(new_refresh_token),
            selected_profile_id: profile_id,
            profiles: user.profiles,
            preferred_language: user.account.preferred_language,
            account_confirmed,
        })
    }

    // =========================================================================
    // TOKEN REFRESH (4.5.5)
    // =========================================================================

    /// Rotates the refresh token and re-mints an access token with the same
    /// `selectedProfileId`. Rejects refreshes attempted before
    /// `tokenMinimumAge` has elapsed since the last refresh.
    pub async fn refresh_token(
        &self,
        auth: &AuthenticatedUser,
        current_refresh_token: &str,
    ) -> Result<TokenPair, ApiError> {
        let user = self
            .user_repo
            .get_by_id(&auth.instance_id, auth.user_id)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        let now = Utc::now().timestamp();
        if now - user.last_token_refresh < self.jwt_service.token_minimum_age_seconds() {
            return Err(ApiError::InvalidToken);
        }

        let removed = self
            .user_repo
            .remove_refresh_token(&auth.instance_id, auth.user_id, current_refresh_token)
            .await?;
        if !removed {
            return Err(ApiError::InvalidToken);
        }

        let new_refresh_token = generate_opaque_token(16);
        self.user_repo
            .push_refresh_token(&auth.instance_id, auth.user_id, &new_refresh_token)
            .await?;
        self.user_repo
            .update_last_token_refresh(&auth.instance_id, auth.user_id, now)
            .await?;

        let selected = auth.selected_profile_id;
        let other_profile_ids = user.other_profile_ids(selected);
        let account_confirmed = user.account.account_confirmed_at > 0;

        let access_token = self.jwt_service.generate_access_token(
            user.id,
            &user.instance_id,
            &user.roles,
            selected,
            &other_profile_ids,
            account_confirmed,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token: Some(new_refresh_token),
            selected_profile_id: selected,
            profiles: user.profiles,
            preferred_language: user.account.preferred_language,
            account_confirmed,
        })
    }

    // =========================================================================
    // LOGOUT (4.5.6)
    // =========================================================================

    /// Removes the presented refresh token from the user's ring. Idempotent
    /// on absence — logging out twice with the same token is not an error.
    pub async fn logout(&self, auth: &AuthenticatedUser, refresh_token: &str) -> Result<(), ApiError> {
        self.user_repo
            .remove_refresh_token(&auth.instance_id, auth.user_id, refresh_token)
            .await?;
        Ok(())
    }

    // =========================================================================
    // CHANGE PASSWORD (4.5.7, supplemental)
    // =========================================================================

    /// Changes the authenticated user's password, clearing every other
    /// session's refresh token in the process (same rationale as password
    /// reset: a changed credential invalidates trust issued under the old
    /// one).
    pub async fn change_password(
        &self,
        auth: &AuthenticatedUser,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        let mut user = self
            .user_repo
            .get_by_id(&auth.instance_id, auth.user_id)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !self.password_hasher.verify(old_password, &user.account.password)? {
            return Err(ApiError::InvalidCredentials);
        }

        PasswordPolicy::validate_with_config(new_password, &self.password_policy)
            .map_err(|_| ApiError::PasswordTooWeak)?;

        user.account.password = self.password_hasher.hash(new_password)?;
        user.account.refresh_tokens.clear();
        self.user_repo.update_user(&user).await?;

        let event = PasswordChanged {
            user_id: user.id,
            instance_id: user.instance_id,
            via_reset: false,
            occurred_at: Utc::now(),
        };
        info!(event = event.event_type(), "password changed");

        Ok(())
    }

    // =========================================================================
    // DELETE ACCOUNT (4.5.8, supplemental)
    // =========================================================================

    /// Deletes the authenticated user's account after confirming their
    /// current password. Idempotent per-call: a second call against the
    /// same (now-absent) user surfaces `NotFound`.
    pub async fn delete_account(&self, auth: &AuthenticatedUser, password: &str) -> Result<(), ApiError> {
        let user = self
            .user_repo
            .get_by_id(&auth.instance_id, auth.user_id)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !self.password_hasher.verify(password, &user.account.password)? {
            return Err(ApiError::InvalidCredentials);
        }

        self.user_repo.delete_user(&auth.instance_id, auth.user_id).await
    }

    // =========================================================================
    // INTERNAL HELPERS
    // =========================================================================

    /// Mints a fresh token pair for `user`, pushes the new refresh token
    /// onto the ring, and stamps `lastLogin`. Shared by password login and
    /// signup (both end in the same session-issuance step).
    async fn issue_session(&self, user: User, method: &str) -> Result<TokenPair, ApiError> {
        let profile = user.default_profile().clone();
        let other_profile_ids = user.other_profile_ids(profile.id);
        let account_confirmed = user.account.account_confirmed_at > 0;

        let access_token = self.jwt_service.generate_access_token(
            user.id,
            &user.instance_id,
            &user.roles,
            profile.id,
            &other_profile_ids,
            account_confirmed,
        )?;
        let refresh_token = generate_opaque_token(16);

        self.user_repo
            .push_refresh_token(&user.instance_id, user.id, &refresh_token)
            .await?;
        self.user_repo
            .update_last_login(&user.instance_id, user.id, Utc::now().timestamp())
            .await?;

        self.log_login(&user, method);

        Ok(TokenPair {
            access_token,
            refresh_token: Some(refresh_token),
            selected_profile_id: profile.id,
            profiles: user.profiles,
            preferred_language: user.account.preferred_language,
            account_confirmed,
        })
    }

    fn log_login(&self, user: &User, method: &str) {
        let event = UserLoggedIn {
            user_id: user.id,
            instance_id: user.instance_id.clone(),
            method: method.to_string(),
            occurred_at: Utc::now(),
        };
        info!(event = event.event_type(), user_id = %user.id, "user logged in");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::config::{JwtConfig, MessagingConfig};

    fn test_jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new(JwtConfig {
            secret: "test_secret_key_minimum_32_chars_required".to_string(),
            access_token_ttl_seconds: 900,
            token_minimum_age_seconds: 30,
        }))
    }

    fn test_messaging() -> Arc<MessagingClient> {
        Arc::new(MessagingClient::new(&MessagingConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 100,
        }))
    }

    fn test_temp_token_config() -> TempTokenConfig {
        TempTokenConfig {
            contact_verification_seconds: 86_400,
            password_reset_seconds: 3_600,
            survey_login_seconds: 900,
            unsubscribe_newsletter_seconds: 2_592_000,
            invitation_seconds: 604_800,
        }
    }

    #[test]
    fn test_token_pair_omits_refresh_token_when_none() {
        let pair = TokenPair {
            access_token: "access".to_string(),
            refresh_token: None,
            selected_profile_id: Uuid::new_v4(),
            profiles: vec![],
            preferred_language: "en".to_string(),
            account_confirmed: false,
        };
        let json = serde_json::to_string(&pair).unwrap();
        assert!(!json.contains("refreshToken"));
    }

    #[test]
    fn test_token_pair_includes_refresh_token_when_present() {
        let pair = TokenPair {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            selected_profile_id: Uuid::new_v4(),
            profiles: vec![],
            preferred_language: "en".to_string(),
            account_confirmed: true,
        };
        let json = serde_json::to_string(&pair).unwrap();
        assert!(json.contains("refreshToken"));
    }

    // Construction-only smoke test: exercises the dummy-hash computation
    // `AuthService::new` performs so the miss-path of `login_with_email` has
    // a real PHC digest to verify against. Full login flows need a
    // database and are covered by integration tests.
    #[test]
    fn test_dummy_hash_is_phc_format() {
        let hasher = PasswordHasher::new();
        let dummy = hasher.hash("dummy-password-for-timing-00").unwrap();
        assert!(dummy.starts_with("$argon2id$"));
        let _ = (test_jwt(), test_messaging(), test_temp_token_config());
    }
}
