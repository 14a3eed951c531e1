//! # Data Transfer Objects (DTOs)
//!
//! DTOs define the structure of data transferred between client and server.
//! They serve as the **API contract** and handle:
//!
//! - **Request validation**: Using the `validator` crate
//! - **Deserialization**: JSON → Rust structs via `serde`
//! - **Serialization**: Rust structs → JSON for responses
//!
//! ## DTO Categories
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              DTOs                                       │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Non-admin requests                 Admin requests                      │
//! │  ───────────────────                ─────────────                      │
//! │  - LoginWithEmailRequest            - CreateUserRequest                 │
//! │  - LoginWithTempTokenRequest        - AddRoleForUserRequest             │
//! │  - SignupWithEmailRequest           - RemoveRoleForUserRequest          │
//! │  - SwitchProfileRequest                                                 │
//! │  - RefreshTokenRequest                                                  │
//! │  - LogoutRequest                                                        │
//! │  - ChangePasswordRequest                                                │
//! │  - DeleteAccountRequest                                                 │
//! │  - RequestPasswordResetRequest                                         │
//! │  - ResetPasswordRequest                                                 │
//! │  - UnsubscribeNewsletterRequest                                         │
//! │  - VerifyContactRequest                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## JSON Naming Convention
//!
//! All DTOs use `camelCase` for JSON serialization.
//!
//! ## Validation
//!
//! Field-shape validation runs through [`shared::validation::validate_request`],
//! which folds any failure into `ApiError::ValidationError` — rendered as the
//! stable wire string `"missing arguments"` (plural). Admin request DTOs
//! instead validate by hand in their handler via `is_structurally_valid`,
//! returning the same `ApiError::MissingArguments` on failure — the original
//! system's admin endpoint tests assert on the identical plural string.
//!
//! ## Related Documentation
//!
//! - Validation module: [`shared::validation`]
//! - API handlers: [`super::handlers`]

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::service::auth_service::TokenPair;

// =============================================================================
// LOGIN
// =============================================================================

/// `LoginWithEmail{instanceId, email, password, asParticipant}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginWithEmailRequest {
    #[validate(length(min = 1))]
    pub instance_id: String,
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub as_participant: bool,
}

/// `LoginWithTempToken{token}` — magic-link/survey hand-off.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginWithTempTokenRequest {
    #[validate(length(min = 1))]
    pub token: String,
}

// =============================================================================
// SIGNUP
// =============================================================================

/// `SignupWithEmail{instanceId, email, password, preferredLanguage}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupWithEmailRequest {
    #[validate(length(min = 1))]
    pub instance_id: String,
    #[validate(length(min = 1))]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1))]
    pub preferred_language: String,
}

// =============================================================================
// SESSION LIFECYCLE
// =============================================================================

/// `SwitchProfile{token, profileId, refreshToken}`. `token` is carried by
/// the `Authorization` header, not this body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SwitchProfileRequest {
    pub profile_id: Uuid,
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// `RefreshToken{token, refreshToken}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// `Logout{token, refreshToken}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

// =============================================================================
// ACCOUNT LIFECYCLE (supplemental)
// =============================================================================

/// `ChangePassword{token, oldPassword, newPassword}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 1))]
    pub new_password: String,
}

/// `DeleteAccount{token, password}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountRequest {
    #[validate(length(min = 1))]
    pub password: String,
}

// =============================================================================
// VERIFICATION
// =============================================================================

/// `VerifyContact{token}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyContactRequest {
    #[validate(length(min = 1))]
    pub token: String,
}

/// `RequestPasswordReset{instanceId, email}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RequestPasswordResetRequest {
    #[validate(length(min = 1))]
    pub instance_id: String,
    #[validate(length(min = 1))]
    pub email: String,
}

/// `ResetPassword{token, newPassword}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 1))]
    pub new_password: String,
}

/// `UnsubscribeNewsletter{token}`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeNewsletterRequest {
    #[validate(length(min = 1))]
    pub token: String,
}

// =============================================================================
// ADMIN — validated by hand, "missing argument" (singular) on failure
// =============================================================================

/// `CreateUser{token(admin), accountId, initialPassword, roles, preferredLanguage}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub account_id: String,
    pub initial_password: String,
    pub roles: Vec<String>,
    pub preferred_language: String,
}

impl CreateUserRequest {
    /// Structural validation distinct from [`shared::validation::validate_request`]
    /// — admin endpoints validate a superset of fields and report the
    /// singular `"missing argument"` wire string, not the plural used by
    /// non-admin endpoints.
    pub fn is_structurally_valid(&self) -> bool {
        !self.account_id.trim().is_empty()
            && !self.initial_password.is_empty()
            && !self.preferred_language.trim().is_empty()
    }
}

/// `AddRoleForUser`/`RemoveRoleForUser{token(admin), userId, role}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMutationRequest {
    pub user_id: Uuid,
    pub role: String,
}

impl RoleMutationRequest {
    pub fn is_structurally_valid(&self) -> bool {
        !self.role.trim().is_empty()
    }
}

/// `FindNonParticipantUsers{token(admin), instanceId}`. Carried as a query
/// parameter, not a JSON body, since the endpoint has no other input.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindNonParticipantUsersQuery {
    pub instance_id: String,
}

impl FindNonParticipantUsersQuery {
    pub fn is_structurally_valid(&self) -> bool {
        !self.instance_id.trim().is_empty()
    }
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

/// Generic acknowledgement for operations with no meaningful payload
/// (`Logout`, `ChangePassword`, `DeleteAccount`, `RequestPasswordReset`,
/// `ResetPassword`, `UnsubscribeNewsletter`).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AckResponse {
    pub ok: bool,
}

impl Default for AckResponse {
    fn default() -> Self {
        Self { ok: true }
    }
}

// Re-exported so handlers can return it directly without reaching into the
// service module.
pub type TokenPairResponse = TokenPair;

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_with_email_request_rejects_blank_fields() {
        let request = LoginWithEmailRequest {
            instance_id: "i".to_string(),
            email: "".to_string(),
            password: "pw".to_string(),
            as_participant: false,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_login_with_email_request_accepts_populated_fields() {
        let request = LoginWithEmailRequest {
            instance_id: "i".to_string(),
            email: "user@example.com".to_string(),
            password: "pw".to_string(),
            as_participant: true,
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_user_request_structural_validation() {
        let incomplete = CreateUserRequest {
            account_id: "  ".to_string(),
            initial_password: "pw".to_string(),
            roles: vec![],
            preferred_language: "en".to_string(),
        };
        assert!(!incomplete.is_structurally_valid());

        let complete = CreateUserRequest {
            account_id: "staff@example.com".to_string(),
            initial_password: "SuperSecure1".to_string(),
            roles: vec!["ADMIN".to_string()],
            preferred_language: "en".to_string(),
        };
        assert!(complete.is_structurally_valid());
    }

    #[test]
    fn test_ack_response_serializes() {
        let json = serde_json::to_string(&AckResponse::default()).unwrap();
        assert_eq!(json, r#"{"ok":true}"#);
    }
}
