//! # Application Error Types
//!
//! Unified error handling with automatic HTTP conversion.
//!
//! ## Design Philosophy
//!
//! Every variant maps to one of six internal taxonomy categories
//! (`InvalidArgument`, `PermissionDenied`, `Unauthenticated`, `NotFound`,
//! `AlreadyExists`, `Internal`) and to a specific HTTP status code. A handful
//! of variants render *stable, case-sensitive* wire strings that client tests
//! assert on verbatim — those are spelled out one variant per message rather
//! than parameterized, so the string can never drift from what's documented.
//!
//! ## HTTP Response Format
//!
//! ```json
//! {
//!   "code": "INVALID_ARGUMENT",
//!   "message": "missing arguments",
//!   "request_id": "550e8400-e29b-41d4-a716-446655440000",
//!   "details": { ... },
//!   "timestamp": "2024-01-15T10:30:00Z"
//! }
//! ```
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::errors::{ApiError, ApiResult};
//!
//! async fn get_profile(id: Uuid) -> ApiResult<Profile> {
//!     repo.find_profile(id)
//!         .await
//!         .map_err(ApiError::Database)?
//!         .ok_or(ApiError::ProfileNotFound)
//! }
//! ```

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

/// Result type alias for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

/// Application error type with automatic HTTP status mapping.
///
/// Each variant represents a specific error condition. Variants whose
/// `#[error("...")]` message is quoted in §6 of the RPC surface are stable
/// wire strings — do not reword them.
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // InvalidArgument (400)
    // =========================================================================
    /// Structural validation failed — a required field was absent or blank.
    /// Shared by non-admin and admin endpoints alike.
    #[error("missing arguments")]
    MissingArguments,

    /// Signup/admin-create email shape failed validation.
    #[error("email not valid")]
    EmailNotValid,

    /// New password failed the strength policy (C1).
    #[error("password too weak")]
    PasswordTooWeak,

    /// Admin-create `accountId` is not a syntactically valid email address.
    #[error("account id not a valid email")]
    AccountIdNotValidEmail,

    /// Field-level validation failures from the `validator` crate.
    #[error("missing arguments")]
    ValidationError(#[from] ValidationErrors),

    // =========================================================================
    // Unauthenticated (401)
    // =========================================================================
    /// Wrong email/password, or wrong email on an unknown account. Identical
    /// message for both to resist user enumeration (P6).
    #[error("invalid username and/or password")]
    InvalidCredentials,

    /// Access token missing, malformed, tampered, or expired.
    #[error("invalid token")]
    InvalidToken,

    /// A temp-token lookup missed entirely.
    #[error("wrong token")]
    WrongToken,

    /// A temp-token was found but its purpose doesn't match the endpoint.
    #[error("wrong token purpose")]
    WrongTokenPurpose,

    // =========================================================================
    // PermissionDenied (403)
    // =========================================================================
    /// `ADMIN` role absent from the verified access token's claims.
    #[error("permission denied")]
    PermissionDenied,

    // =========================================================================
    // NotFound (404)
    // =========================================================================
    /// `SwitchProfile` target profile doesn't belong to the user.
    #[error("profile not found")]
    ProfileNotFound,

    /// Generic resource-not-found (user by ID, temp-token record, etc.).
    #[error("resource not found: {resource}")]
    NotFound {
        /// Resource identifier (e.g., "user:<uuid>")
        resource: String,
    },

    // =========================================================================
    // AlreadyExists (409)
    // =========================================================================
    /// Uniqueness violation on `(instanceId, accountId)` (I1).
    #[error("resource already exists: {resource}")]
    AlreadyExists {
        /// Description of the conflict (e.g., "account:user@example.com")
        resource: String,
    },

    // =========================================================================
    // Internal (500)
    // =========================================================================
    /// PostgreSQL query failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Password hashing/verification failed (not a password mismatch — that's
    /// `InvalidCredentials`; this is a hasher-level failure).
    #[error("password hashing error")]
    PasswordHash(String),

    /// Unspecified internal error.
    #[error("internal server error")]
    Internal {
        /// Internal message for logging (not exposed to client)
        message: String,
    },

    /// The downstream messaging collaborator is unreachable. Never surfaced
    /// to callers on its own (§7: side-effect failures are logged, not
    /// propagated) but kept as a distinct variant for the client used
    /// internally by `MessagingClient`.
    #[error("messaging service unavailable")]
    MessagingUnavailable,
}

impl ApiError {
    /// Returns the internal error taxonomy name (§7), stable for programmatic
    /// handling by API clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingArguments
            | Self::EmailNotValid
            | Self::PasswordTooWeak
            | Self::AccountIdNotValidEmail
            | Self::ValidationError(_) => "INVALID_ARGUMENT",

            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::WrongToken
            | Self::WrongTokenPurpose => "UNAUTHENTICATED",

            Self::PermissionDenied => "PERMISSION_DENIED",

            Self::ProfileNotFound | Self::NotFound { .. } => "NOT_FOUND",

            Self::AlreadyExists { .. } => "ALREADY_EXISTS",

            Self::Database(_)
            | Self::PasswordHash(_)
            | Self::Internal { .. }
            | Self::MessagingUnavailable => "INTERNAL",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingArguments
            | Self::EmailNotValid
            | Self::PasswordTooWeak
            | Self::AccountIdNotValidEmail
            | Self::ValidationError(_) => StatusCode::BAD_REQUEST,

            Self::InvalidCredentials
            | Self::InvalidToken
            | Self::WrongToken
            | Self::WrongTokenPurpose => StatusCode::UNAUTHORIZED,

            Self::PermissionDenied => StatusCode::FORBIDDEN,

            Self::ProfileNotFound | Self::NotFound { .. } => StatusCode::NOT_FOUND,

            Self::AlreadyExists { .. } => StatusCode::CONFLICT,

            Self::Database(_)
            | Self::PasswordHash(_)
            | Self::Internal { .. }
            | Self::MessagingUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` if this is a server-side error (5xx) that should be
    /// logged at `error!` level and monitored. Client errors (4xx) are
    /// logged at `warn!` level.
    pub fn is_server_error(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Standard error response body for the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (§7 taxonomy name).
    pub code: String,

    /// Human-readable message. For the variants named in §6 this is the
    /// exact stable string; callers may assert on it directly.
    pub message: String,

    /// Request ID for tracing across services.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Additional error details (field-level validation errors, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,

    /// When the error occurred (ISO 8601 format)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorResponse {
    /// Creates a new error response from an `ApiError`.
    pub fn new(error: &ApiError) -> Self {
        let details = match error {
            ApiError::ValidationError(errors) => {
                Some(serde_json::to_value(errors).unwrap_or_default())
            }
            // Server errors: don't expose internal details to the client.
            ApiError::Database(_) | ApiError::PasswordHash(_) | ApiError::Internal { .. } => None,
            _ => None,
        };

        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            request_id: None,
            details,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Adds a request ID for tracing.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id.to_string());
        self
    }
}

/// Implements Actix-web's `ResponseError` trait so handlers can return
/// `Result<_, ApiError>` directly.
impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let response = ErrorResponse::new(self);
        HttpResponse::build(self.status_code()).json(response)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_errors_return_401() {
        assert_eq!(ApiError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::WrongToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::WrongTokenPurpose.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_permission_denied_returns_403() {
        assert_eq!(ApiError::PermissionDenied.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_not_found_variants_return_404() {
        assert_eq!(ApiError::ProfileNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::NotFound { resource: "user:1".to_string() }.status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_already_exists_returns_409() {
        assert_eq!(
            ApiError::AlreadyExists { resource: "account:a@b.com".to_string() }.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_stable_wire_strings() {
        assert_eq!(ApiError::MissingArguments.to_string(), "missing arguments");
        assert_eq!(ApiError::PermissionDenied.to_string(), "permission denied");
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "invalid username and/or password"
        );
        assert_eq!(ApiError::InvalidToken.to_string(), "invalid token");
        assert_eq!(ApiError::WrongToken.to_string(), "wrong token");
        assert_eq!(ApiError::WrongTokenPurpose.to_string(), "wrong token purpose");
        assert_eq!(ApiError::EmailNotValid.to_string(), "email not valid");
        assert_eq!(ApiError::PasswordTooWeak.to_string(), "password too weak");
        assert_eq!(ApiError::ProfileNotFound.to_string(), "profile not found");
        assert_eq!(
            ApiError::AccountIdNotValidEmail.to_string(),
            "account id not a valid email"
        );
    }

    #[test]
    fn test_error_codes_match_taxonomy() {
        assert_eq!(ApiError::MissingArguments.error_code(), "INVALID_ARGUMENT");
        assert_eq!(ApiError::InvalidCredentials.error_code(), "UNAUTHENTICATED");
        assert_eq!(ApiError::PermissionDenied.error_code(), "PERMISSION_DENIED");
        assert_eq!(ApiError::ProfileNotFound.error_code(), "NOT_FOUND");
        assert_eq!(
            ApiError::AlreadyExists { resource: "x".to_string() }.error_code(),
            "ALREADY_EXISTS"
        );
        assert_eq!(
            ApiError::Internal { message: "x".to_string() }.error_code(),
            "INTERNAL"
        );
    }

    #[test]
    fn test_server_errors_are_flagged() {
        assert!(ApiError::Internal { message: "test".to_string() }.is_server_error());
        assert!(ApiError::MessagingUnavailable.is_server_error());
        assert!(!ApiError::InvalidCredentials.is_server_error());
        assert!(!ApiError::ProfileNotFound.is_server_error());
    }

    #[test]
    fn test_error_response_includes_timestamp() {
        let error = ApiError::InvalidCredentials;
        let response = ErrorResponse::new(&error);

        let now = chrono::Utc::now();
        let diff = now - response.timestamp;
        assert!(diff.num_seconds() < 60);
    }

    #[test]
    fn test_error_response_with_request_id() {
        let error = ApiError::InvalidCredentials;
        let request_id = Uuid::new_v4();
        let response = ErrorResponse::new(&error).with_request_id(request_id);

        assert_eq!(response.request_id, Some(request_id.to_string()));
    }
}
