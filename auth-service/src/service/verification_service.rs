//! # Verification Service
//!
//! Applies the outcomes of every temp-token-mediated, unauthenticated flow
//! that doesn't fit the login/signup state machine: contact verification,
//! password reset, and newsletter unsubscribe. All three share one token
//! taxonomy ([`TempTokenPurpose`]) but apply distinct state transitions on
//! success.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use shared::{
    auth::password::{PasswordHasher, PasswordPolicy},
    config::{PasswordPolicyConfig, TempTokenConfig},
    errors::ApiError,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::entities::{NewTempToken, TempTokenPurpose, UserProfileView};
use crate::domain::events::{ContactVerified, DomainEvent, PasswordChanged};
use crate::repository::{TempTokenRepository, UserRepository};
use crate::service::messaging_client::MessagingClient;

/// Outcome of a successful `VerifyContact` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyContactResult {
    pub user: UserProfileView,
    pub contact_info_id: Uuid,
    pub account_confirmed: bool,
}

/// Orchestrates contact verification, password reset, and newsletter
/// unsubscribe — every flow driven purely by an opaque temp-token, with no
/// authenticated session involved.
#[derive(Clone)]
pub struct VerificationService {
    user_repo: UserRepository,
    temp_token_repo: TempTokenRepository,
    password_hasher: PasswordHasher,
    messaging: Arc<MessagingClient>,
    password_policy: PasswordPolicyConfig,
    temp_token_config: TempTokenConfig,
}

impl VerificationService {
    pub fn new(
        user_repo: UserRepository,
        temp_token_repo: TempTokenRepository,
        password_hasher: PasswordHasher,
        messaging: Arc<MessagingClient>,
        password_policy: PasswordPolicyConfig,
        temp_token_config: TempTokenConfig,
    ) -> Self {
        Self {
            user_repo,
            temp_token_repo,
            password_hasher,
            messaging,
            password_policy,
            temp_token_config,
        }
    }

    // =========================================================================
    // CONTACT VERIFICATION
    // =========================================================================

    /// Applies a `contact-verification` temp-token. Verifying a secondary
    /// contact confirms only that contact; verifying the one whose address
    /// matches `account.accountId` also confirms the account itself.
    pub async fn verify_contact(&self, token: &str) -> Result<VerifyContactResult, ApiError> {
        let temp_token = self
            .temp_token_repo
            .get_by_token(token)
            .await?
            .ok_or(ApiError::WrongToken)?;

        if temp_token.purpose != TempTokenPurpose::ContactVerification.as_str() {
            return Err(ApiError::WrongTokenPurpose);
        }

        let mut user = self
            .user_repo
            .get_by_id(&temp_token.instance_id, temp_token.user_id)
            .await?
            .ok_or(ApiError::WrongToken)?;

        let contact_type = temp_token.info.get("type").map(String::as_str).unwrap_or("");
        let email = temp_token.info.get("email").map(String::as_str).unwrap_or("");

        let contact_info_id = {
            let contact = user
                .contact_infos
                .iter_mut()
                .find(|c| c.contact_type == contact_type && c.address == email)
                .ok_or(ApiError::WrongToken)?;

            let now = Utc::now().timestamp();
            contact.confirmed_at = now;
            contact.id
        };

        let account_confirmed = if email == user.account.account_id {
            user.account.account_confirmed_at = Utc::now().timestamp();
            true
        } else {
            user.account.account_confirmed_at > 0
        };

        self.user_repo.update_user(&user).await?;
        self.temp_token_repo.delete_by_token(token).await?;

        let event = ContactVerified {
            user_id: user.id,
            instance_id: user.instance_id.clone(),
            contact_info_id,
            account_confirmed,
            occurred_at: Utc::now(),
        };
        info!(event = event.event_type(), user_id = %user.id, "contact verified");

        Ok(VerifyContactResult {
            contact_info_id,
            account_confirmed,
            user: UserProfileView::from(user),
        })
    }

    // =========================================================================
    // PASSWORD RESET
    // =========================================================================

    /// Issues a `password-reset` temp-token and dispatches the reset email,
    /// fire-and-forget. On a miss, does nothing observable — anti-
    /// enumeration, same posture as signup.
    pub async fn request_password_reset(&self, instance_id: &str, email: &str) -> Result<(), ApiError> {
        let Some(user) = self.user_repo.get_by_account_id(instance_id, email).await? else {
            return Ok(());
        };

        let Some(contact) = user.contact_infos.first() else {
            return Ok(());
        };

        let new_token = NewTempToken {
            user_id: user.id,
            instance_id: user.instance_id.clone(),
            purpose: TempTokenPurpose::PasswordReset,
            info: std::collections::HashMap::new(),
            expiration: Utc::now().timestamp() + self.temp_token_config.password_reset_seconds,
        };

        match self.temp_token_repo.add(new_token).await {
            Ok(token) => {
                self.messaging.send_reset_email(&contact.address, &token).await;
            }
            Err(error) => {
                warn!(%error, user_id = %user.id, "failed to issue password-reset temp-token");
            }
        }

        Ok(())
    }

    /// Resolves a `password-reset` temp-token, applies the password policy
    /// to the new password, persists it, clears the refresh-token ring (the
    /// same rationale as [`crate::service::auth_service::AuthService::change_password`]),
    /// and consumes the token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        let temp_token = self
            .temp_token_repo
            .get_by_token(token)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        if temp_token.purpose != TempTokenPurpose::PasswordReset.as_str() {
            return Err(ApiError::WrongTokenPurpose);
        }

        if temp_token.is_expired(Utc::now().timestamp()) {
            return Err(ApiError::InvalidToken);
        }

        PasswordPolicy::validate_with_config(new_password, &self.password_policy)
            .map_err(|_| ApiError::PasswordTooWeak)?;

        let mut user = self
            .user_repo
            .get_by_id(&temp_token.instance_id, temp_token.user_id)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        user.account.password = self.password_hasher.hash(new_password)?;
        user.account.refresh_tokens.clear();
        self.user_repo.update_user(&user).await?;
        self.temp_token_repo.delete_by_token(token).await?;

        let event = PasswordChanged {
            user_id: user.id,
            instance_id: user.instance_id,
            via_reset: true,
            occurred_at: Utc::now(),
        };
        info!(event = event.event_type(), "password reset");

        Ok(())
    }

    // =========================================================================
    // NEWSLETTER UNSUBSCRIBE
    // =========================================================================

    /// Resolves an `unsubscribe-newsletter` temp-token and clears the
    /// subscription flag.
    pub async fn unsubscribe_newsletter(&self, token: &str) -> Result<(), ApiError> {
        let temp_token = self
            .temp_token_repo
            .get_by_token(token)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        if temp_token.purpose != TempTokenPurpose::UnsubscribeNewsletter.as_str() {
            return Err(ApiError::WrongTokenPurpose);
        }

        let mut user = self
            .user_repo
            .get_by_id(&temp_token.instance_id, temp_token.user_id)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        user.contact_preferences.subscribed_to_newsletter = false;
        self.user_repo.update_user(&user).await?;
        self.temp_token_repo.delete_by_token(token).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // `verify_contact`'s primary-vs-secondary branching and the
    // anti-enumeration no-op on `request_password_reset` miss both require a
    // database and are exercised by integration tests; the unit-testable
    // surface here is the purpose-string gating, covered indirectly by
    // `TempTokenPurpose::as_str` in `domain::entities`.

    #[test]
    fn test_verify_contact_result_serializes_camel_case() {
        let result = VerifyContactResult {
            user: UserProfileView {
                id: Uuid::new_v4(),
                instance_id: "instance-1".to_string(),
                account: crate::domain::entities::AccountView {
                    account_type: "email".to_string(),
                    account_id: "user@example.com".to_string(),
                    account_confirmed_at: 0,
                    preferred_language: "en".to_string(),
                },
                roles: vec!["PARTICIPANT".to_string()],
                profiles: vec![],
                contact_infos: vec![],
                contact_preferences: Default::default(),
                last_login: 0,
                last_token_refresh: 0,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            contact_info_id: Uuid::new_v4(),
            account_confirmed: true,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("contactInfoId"));
        assert!(json.contains("accountConfirmed"));
    }
}
