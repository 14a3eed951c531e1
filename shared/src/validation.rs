//! # Request Validation Helpers
//!
//! Utilities for validating incoming request data using the `validator` crate.
//!
//! ## Overview
//!
//! This module provides:
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`validate_request`] | Validate a struct implementing `Validate` |
//! | [`validators`] | Custom validation functions |
//!
//! ## How Validation Works
//!
//! We use the [`validator`](https://docs.rs/validator/) crate which provides
//! derive macros for declarative validation:
//!
//! ```rust,ignore
//! use validator::Validate;
//!
//! #[derive(Validate)]
//! struct SignupWithEmail {
//!     #[validate(email)]
//!     email: String,
//!
//!     #[validate(custom(function = "validators::not_blank"))]
//!     preferred_language: String,
//! }
//! ```
//!
//! Field-shape validation (`#[validate(email)]`, length bounds) is handled
//! declaratively on the DTOs in `auth-service::api::dto`. The domain-specific
//! checks named by §4.1/§4.3/§4.5.3 of the spec — password strength, email
//! syntax used as an `accountId`, temp-token purpose matching — live next to
//! the components that own those rules ([`crate::auth::password::PasswordPolicy`],
//! `auth-service::service::auth_service`) rather than here, since they carry
//! behavior beyond a yes/no check (e.g. producing the exact `"password too
//! weak"` / `"email not valid"` wire strings from §6).
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::validation::validate_request;
//!
//! async fn handler(body: web::Json<SignupRequest>) -> Result<impl Responder, ApiError> {
//!     validate_request(&body)?;
//!     // Validation passed, continue...
//! }
//! ```

use crate::errors::ApiError;
use validator::Validate;

// =============================================================================
// Core Validation Functions
// =============================================================================

/// Validates a request DTO that implements `Validate`.
///
/// This is the primary validation function. Use it in handlers to
/// validate incoming data before it reaches the service layer.
///
/// ## Errors
///
/// Returns `ApiError::ValidationError` with field-level details if validation fails.
pub fn validate_request<T: Validate>(data: &T) -> Result<(), ApiError> {
    data.validate().map_err(ApiError::ValidationError)
}

// =============================================================================
// Custom Validators
// =============================================================================

/// Custom validation functions for use with `#[validate(custom)]`.
///
/// These functions follow the validator crate's signature:
/// `fn(&T) -> Result<(), ValidationError>`
pub mod validators {
    use validator::ValidationError;

    /// Validates that a string is not blank (empty or whitespace-only).
    ///
    /// Used on admin role-mutation fields (role name, accountId) where
    /// `validator`'s built-in `length(min = 1)` would accept a
    /// whitespace-only string.
    pub fn not_blank(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::new("blank"));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::validators::*;

    #[test]
    fn test_not_blank_valid() {
        assert!(not_blank("hello").is_ok());
        assert!(not_blank("  hello  ").is_ok());
        assert!(not_blank("a").is_ok());
    }

    #[test]
    fn test_not_blank_invalid() {
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("\t\n").is_err());
    }
}
