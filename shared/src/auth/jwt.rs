//! # Access Token Codec (C2)
//!
//! Mints and validates signed access tokens. Refresh tokens are a separate,
//! opaque concept — see [`crate::auth::token`] — and are never handled here.
//!
//! ## Token Structure
//!
//! A JWT consists of three parts separated by dots:
//!
//! ```text
//! xxxxx.yyyyy.zzzzz
//! ├────┼─────┼────┤
//! │    │     │    └── Signature (verifies integrity)
//! │    │     └─────── Payload (claims - the actual data)
//! │    └───────────── Header (algorithm and token type)
//! ```
//!
//! ## Claims (Token Payload)
//!
//! | Claim | Description |
//! |-------|-------------|
//! | `sub` | User ID |
//! | `instance_id` | Tenant this user belongs to |
//! | `roles` | Role strings at issuance time |
//! | `selected_profile_id` | The profile this session is acting as |
//! | `other_profile_ids` | The user's remaining profile IDs (client-side switch UI) |
//! | `account_confirmed` | Mirrors `account.accountConfirmedAt > 0` (I6) |
//! | `exp` | Expiration time (Unix timestamp) |
//! | `iat` | Issued at (Unix timestamp) |
//!
//! ## Security Notes
//!
//! - We use **HS256** (HMAC-SHA256) for signing.
//! - Secret key must be at least 32 characters.
//! - Tokens are validated for: signature, expiration (with configured leeway).
//! - Role revocation takes effect only once the access token expires (§9) —
//!   the `ADMIN` check (C7) reads `roles` from these claims, not the user
//!   document.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::auth::jwt::JwtService;
//! use shared::config::JwtConfig;
//!
//! let jwt_service = JwtService::new(config.jwt);
//!
//! let token = jwt_service.generate_access_token(
//!     user_id, instance_id, &roles, profile_id, &other_profile_ids, account_confirmed,
//! )?;
//!
//! let claims = jwt_service.validate_access_token(&token)?;
//! let token = JwtService::extract_from_header("Bearer eyJhbGc...")?;
//! ```

use crate::config::JwtConfig;
use crate::errors::ApiError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Claims Structure
// =============================================================================

/// Access-token claims (§4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - the user's unique identifier (UUID).
    pub sub: Uuid,

    /// Tenant this token is scoped to. Every store lookup made on behalf of
    /// this token must be restricted to this instance.
    pub instance_id: String,

    /// Role strings held by the user at issuance time (§9: admin checks read
    /// this, not the live user document).
    pub roles: Vec<String>,

    /// The profile this session is currently acting as.
    pub selected_profile_id: Uuid,

    /// The user's other profile IDs, included so clients can offer a
    /// profile-switch UI without an extra round-trip.
    pub other_profile_ids: Vec<Uuid>,

    /// Mirrors `account.accountConfirmedAt > 0` at issuance time (I6).
    pub account_confirmed: bool,

    /// Expiration time as Unix timestamp (seconds since epoch).
    pub exp: i64,

    /// Issued-at time as Unix timestamp.
    pub iat: i64,
}

// =============================================================================
// JWT Service
// =============================================================================

/// Service for access-token generation and validation.
///
/// ## Thread Safety
///
/// This type is `Clone` and can be wrapped in `Arc` for sharing across async
/// tasks. The underlying keys are immutable after construction.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    config: JwtConfig,
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            encoding_key,
            decoding_key,
            config,
        }
    }

    /// Returns the configured access-token TTL in seconds.
    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.config.access_token_ttl_seconds as i64
    }

    /// Returns the configured minimum age (seconds) a refresh token must
    /// reach since `lastTokenRefresh` before it can be used again (§4.5.5).
    pub fn token_minimum_age_seconds(&self) -> i64 {
        self.config.token_minimum_age_seconds
    }

    /// Mints a signed access token carrying the authorization context named
    /// in §4.2.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_access_token(
        &self,
        user_id: Uuid,
        instance_id: &str,
        roles: &[String],
        selected_profile_id: Uuid,
        other_profile_ids: &[Uuid],
        account_confirmed: bool,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let ttl = Duration::seconds(self.config.access_token_ttl_seconds as i64);

        let claims = Claims {
            sub: user_id,
            instance_id: instance_id.to_string(),
            roles: roles.to_vec(),
            selected_profile_id,
            other_profile_ids: other_profile_ids.to_vec(),
            account_confirmed,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal {
                message: format!("failed to generate access token: {e}"),
            })
    }

    /// Validates and decodes an access token.
    ///
    /// ## Errors
    ///
    /// Returns `ApiError::InvalidToken` if the signature is invalid, the
    /// token is malformed, or it has expired.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(token, &self.decoding_key, &validation)
            .map_err(|_| ApiError::InvalidToken)?;

        Ok(token_data.claims)
    }

    /// Extracts the token from an `Authorization` header.
    ///
    /// Expects the format: `Bearer <token>`.
    pub fn extract_from_header(auth_header: &str) -> Result<&str, ApiError> {
        auth_header.strip_prefix("Bearer ").ok_or(ApiError::InvalidToken)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test_secret_key_minimum_32_chars_required".to_string(),
            access_token_ttl_seconds: 900,
            token_minimum_age_seconds: 30,
        }
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = JwtService::new(test_config());
        let user_id = Uuid::new_v4();
        let profile_id = Uuid::new_v4();

        let token = service
            .generate_access_token(
                user_id,
                "instance-1",
                &["PARTICIPANT".to_string()],
                profile_id,
                &[],
                false,
            )
            .unwrap();

        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.instance_id, "instance-1");
        assert_eq!(claims.roles, vec!["PARTICIPANT".to_string()]);
        assert_eq!(claims.selected_profile_id, profile_id);
        assert!(!claims.account_confirmed);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = JwtService::new(test_config());
        let token = service
            .generate_access_token(Uuid::new_v4(), "instance-1", &[], Uuid::new_v4(), &[], true)
            .unwrap();

        let mut tampered = token.clone();
        tampered.push('x');

        let result = service.validate_access_token(&tampered);
        assert!(matches!(result, Err(ApiError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut config = test_config();
        config.access_token_ttl_seconds = 0;
        let service = JwtService::new(config);

        let token = service
            .generate_access_token(Uuid::new_v4(), "instance-1", &[], Uuid::new_v4(), &[], true)
            .unwrap();

        std::thread::sleep(std::time::Duration::from_secs(1));

        let result = service.validate_access_token(&token);
        assert!(matches!(result, Err(ApiError::InvalidToken)));
    }

    #[test]
    fn test_extract_from_header_valid() {
        let token = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let header = format!("Bearer {}", token);

        let extracted = JwtService::extract_from_header(&header).unwrap();
        assert_eq!(extracted, token);
    }

    #[test]
    fn test_extract_from_header_invalid() {
        let result = JwtService::extract_from_header("InvalidHeader token");
        assert!(matches!(result, Err(ApiError::InvalidToken)));
    }

    #[test]
    fn test_other_profile_ids_round_trip() {
        let service = JwtService::new(test_config());
        let other = vec![Uuid::new_v4(), Uuid::new_v4()];

        let token = service
            .generate_access_token(Uuid::new_v4(), "instance-1", &[], Uuid::new_v4(), &other, false)
            .unwrap();

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.other_profile_ids, other);
    }
}
