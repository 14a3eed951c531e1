//! # Admin Service
//!
//! Administrative operations gated by the `ADMIN` role claim: creating
//! users with explicit roles, mutating a user's role set, and auditing
//! staff accounts per tenant. Callers (the RPC shell) are responsible for
//! checking [`shared::auth::middleware::AuthenticatedUser::is_admin`]
//! before dispatching here — this service trusts that the check already
//! happened.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use shared::config::PasswordPolicyConfig;
use shared::errors::ApiError;
use validator::ValidateEmail;

use crate::domain::entities::{
    Account, ContactInfo, ContactPreferences, NewUser, Profile, UserProfileView,
};
use crate::domain::events::{DomainEvent, UserRegistered};
use crate::repository::UserRepository;
use shared::auth::password::{PasswordHasher, PasswordPolicy};

/// Administrative operations over the per-tenant user store.
#[derive(Clone)]
pub struct AdminService {
    user_repo: UserRepository,
    password_hasher: PasswordHasher,
    password_policy: PasswordPolicyConfig,
}

impl AdminService {
    pub fn new(
        user_repo: UserRepository,
        password_hasher: PasswordHasher,
        password_policy: PasswordPolicyConfig,
    ) -> Self {
        Self {
            user_repo,
            password_hasher,
            password_policy,
        }
    }

    /// Creates a user with an explicit role set, mirroring signup but
    /// skipping the self-service defaults (`PARTICIPANT`-only role,
    /// email-as-alias profile). `account_id` must still be a syntactically
    /// valid email (a distinct error from the generic `EmailNotValid` used
    /// by signup) and `initial_password` must meet the same strength
    /// policy as any other password in the system.
    pub async fn create_user(
        &self,
        instance_id: &str,
        account_id: &str,
        initial_password: &str,
        roles: Vec<String>,
        preferred_language: &str,
    ) -> Result<UserProfileView, ApiError> {
        let normalized_account_id = account_id.trim().to_lowercase();

        if !normalized_account_id.validate_email() {
            return Err(ApiError::AccountIdNotValidEmail);
        }

        PasswordPolicy::validate_with_config(initial_password, &self.password_policy)
            .map_err(|_| ApiError::PasswordTooWeak)?;

        let password_hash = self.password_hasher.hash(initial_password)?;
        let profile_id = Uuid::new_v4();
        let contact_info_id = Uuid::new_v4();

        let new_user = NewUser {
            instance_id: instance_id.to_string(),
            account: Account {
                account_type: "email".to_string(),
                account_id: normalized_account_id.clone(),
                account_confirmed_at: 0,
                password: password_hash,
                refresh_tokens: Vec::new(),
                preferred_language: preferred_language.to_string(),
            },
            roles,
            profiles: vec![Profile {
                id: profile_id,
                alias: normalized_account_id.clone(),
                avatar_id: String::new(),
            }],
            contact_infos: vec![ContactInfo {
                id: contact_info_id,
                contact_type: "email".to_string(),
                address: normalized_account_id,
                confirmed_at: 0,
            }],
            contact_preferences: ContactPreferences::default(),
        };

        let user = self.user_repo.add_user(new_user).await?;

        let event = UserRegistered {
            user_id: user.id,
            instance_id: user.instance_id.clone(),
            account_id: user.account.account_id.clone(),
            roles: user.roles.clone(),
            via_admin: true,
            occurred_at: Utc::now(),
        };
        info!(event = event.event_type(), user_id = %user.id, "user created by admin");

        Ok(UserProfileView::from(user))
    }

    /// Adds `role` to the user's role set. A no-op success if the role is
    /// already present (roles are an unordered set, duplicates forbidden).
    pub async fn add_role_for_user(
        &self,
        instance_id: &str,
        user_id: Uuid,
        role: &str,
    ) -> Result<(), ApiError> {
        let mut user = self
            .user_repo
            .get_by_id(instance_id, user_id)
            .await?
            .ok_or(ApiError::NotFound {
                resource: format!("user:{user_id}"),
            })?;

        if !user.has_role(role) {
            user.roles.push(role.to_string());
            self.user_repo.update_user(&user).await?;
        }

        Ok(())
    }

    /// Removes `role` from the user's role set. A no-op success if the role
    /// is absent.
    pub async fn remove_role_for_user(
        &self,
        instance_id: &str,
        user_id: Uuid,
        role: &str,
    ) -> Result<(), ApiError> {
        let mut user = self
            .user_repo
            .get_by_id(instance_id, user_id)
            .await?
            .ok_or(ApiError::NotFound {
                resource: format!("user:{user_id}"),
            })?;

        let before = user.roles.len();
        user.roles.retain(|r| r != role);

        if user.roles.len() != before {
            self.user_repo.update_user(&user).await?;
        }

        Ok(())
    }

    /// Lists users in `instance_id` whose role set is not exactly
    /// `{PARTICIPANT}` — staff/admin accounts, for audit tooling.
    pub async fn find_non_participant_users(
        &self,
        instance_id: &str,
    ) -> Result<Vec<UserProfileView>, ApiError> {
        let users = self.user_repo.find_non_participant_users(instance_id).await?;
        Ok(users.into_iter().map(UserProfileView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Account, ContactPreferences, Profile, User};

    fn sample_user(roles: Vec<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            instance_id: "instance-1".to_string(),
            account: Account {
                account_type: "email".to_string(),
                account_id: "staff@example.com".to_string(),
                account_confirmed_at: 0,
                password: "hash".to_string(),
                refresh_tokens: vec![],
                preferred_language: "en".to_string(),
            },
            roles: roles.into_iter().map(String::from).collect(),
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
    fn test_role_set_add_is_idempotent() {
        let mut user = sample_user(vec!["ADMIN"]);
        if !user.has_role("ADMIN") {
            user.roles.push("ADMIN".to_string());
        }
        assert_eq!(user.roles, vec!["ADMIN".to_string()]);
    }

    #[test]
    fn test_role_set_remove_absent_is_noop() {
        let mut user = sample_user(vec!["PARTICIPANT"]);
        let before = user.roles.len();
        user.roles.retain(|r| r != "ADMIN");
        assert_eq!(user.roles.len(), before);
    }
}
