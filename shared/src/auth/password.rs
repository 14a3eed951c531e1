//! # Password Hashing with Argon2id
//!
//! Secure password storage using the Argon2id algorithm.
//!
//! ## Why Argon2id?
//!
//! Argon2 won the [Password Hashing Competition](https://www.password-hashing.net/)
//! in 2015 and is recommended by [OWASP](https://cheatsheetseries.owasp.org/cheatsheets/Password_Storage_Cheat_Sheet.html).
//!
//! There are three variants:
//!
//! | Variant | Resistance | Use Case |
//! |---------|------------|----------|
//! | Argon2d | GPU attacks | Cryptocurrency |
//! | Argon2i | Side-channel | General use |
//! | **Argon2id** | **Both** | **Passwords (recommended)** |
//!
//! We use **Argon2id** which combines the strengths of both variants.
//!
//! ## Security Parameters
//!
//! We use OWASP's "second recommended" option (m=19 MiB, t=2, p=1) — suitable
//! for a service with no dedicated password-hashing hardware:
//!
//! | Parameter | Value | Purpose |
//! |-----------|-------|---------|
//! | Memory | 19 MiB | Makes attacks expensive (GPU memory) |
//! | Iterations | 2 | Time cost (slows brute force) |
//! | Parallelism | 1 | CPU lanes |
//! | Output | 32 bytes | Hash length |
//!
//! ## PHC String Format
//!
//! We use the [PHC String Format](https://github.com/P-H-C/phc-string-format)
//! which is self-describing and includes:
//!
//! ```text
//! $argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>
//! ```
//!
//! ## Password Requirements (C1)
//!
//! `PasswordPolicy` enforces:
//!
//! - Minimum 8 characters
//! - At least 1 letter
//! - At least 1 digit
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::auth::password::{PasswordHasher, PasswordPolicy};
//!
//! let hasher = PasswordHasher::new();
//!
//! if let Err(reasons) = PasswordPolicy::validate(&password) {
//!     return Err(ApiError::PasswordTooWeak);
//! }
//! let hash = hasher.hash(&password)?;
//! // Store hash in database
//!
//! if hasher.verify(&password, &stored_hash)? {
//!     // Password correct
//! } else {
//!     return Err(ApiError::InvalidCredentials);
//! }
//! ```
//!
//! ## Security Notes
//!
//! - **Never store plaintext passwords**
//! - **Each hash includes a unique salt** - Same password → different hashes
//! - **Verification is constant-time** - Prevents timing attacks

use crate::config::PasswordPolicyConfig;
use crate::errors::ApiError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

// =============================================================================
// Password Hasher
// =============================================================================

/// Secure password hashing service using Argon2id.
///
/// ## Thread Safety
///
/// This type is `Clone` and `Send + Sync`, safe for concurrent use.
/// Each hash operation generates a new random salt.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher {
    /// Creates a new hasher with OWASP's second-recommended parameters
    /// (m=19 MiB, t=2, p=1).
    pub fn new() -> Self {
        let params = Params::new(
            19 * 1024, // 19 MiB memory cost
            2,         // 2 iterations (time cost)
            1,         // 1 lane (parallelism)
            None,      // default output length (32 bytes)
        )
        .expect("Invalid Argon2 params"); // Safe: these params are always valid

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Self { argon2 }
    }

    /// Hashes a password for secure storage, returning a PHC-format string
    /// (`$argon2id$v=19$m=19456,t=2,p=1$<salt>$<hash>`).
    pub fn hash(&self, password: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::PasswordHash(format!("hashing failed: {e}")))
    }

    /// Verifies a password against a stored PHC-format hash.
    ///
    /// Constant-time with respect to digest length; cannot be used to
    /// distinguish "close" guesses from "far" ones.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| ApiError::PasswordHash(format!("invalid hash format: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(ApiError::PasswordHash(format!("verification failed: {e}"))),
        }
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}

// =============================================================================
// Password Policy
// =============================================================================

/// Validates password strength before hashing (C1).
///
/// The thresholds are configurable (`PasswordPolicyConfig`); [`validate`]
/// checks against the conservative defaults (8+ characters, 1+ letter, 1+
/// digit) for callers with no config at hand, while [`validate_with_config`]
/// is what the service layer actually calls in production.
pub struct PasswordPolicy;

impl PasswordPolicy {
    /// Validates a password against the default strength requirements
    /// (8+ characters, 1+ letter, 1+ digit).
    ///
    /// Returns the list of failed requirements; callers that only need a
    /// yes/no answer can check `.is_ok()`.
    pub fn validate(password: &str) -> Result<(), Vec<&'static str>> {
        Self::validate_with_config(password, &PasswordPolicyConfig::defaults())
    }

    /// Validates a password against a configured strength policy.
    pub fn validate_with_config(
        password: &str,
        config: &PasswordPolicyConfig,
    ) -> Result<(), Vec<&'static str>> {
        let mut errors = Vec::new();

        if password.len() < config.min_length {
            errors.push("password does not meet the minimum length requirement");
        }

        if config.require_letter && !password.chars().any(|c| c.is_alphabetic()) {
            errors.push("password must contain at least one letter");
        }

        if config.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("password must contain at least one digit");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Convenience boolean form for call sites that only need pass/fail.
    pub fn is_strong_enough(password: &str) -> bool {
        Self::validate(password).is_ok()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_correct_password() {
        let hasher = PasswordHasher::new();
        let password = "correcthorse1";

        let hash = hasher.hash(password).unwrap();

        assert_ne!(hash, password);
        assert!(hasher.verify(password, &hash).unwrap());
    }

    #[test]
    fn test_verify_wrong_password() {
        let hasher = PasswordHasher::new();
        let password = "correcthorse1";
        let wrong_password = "wrongbattery2";

        let hash = hasher.hash(password).unwrap();

        assert!(!hasher.verify(wrong_password, &hash).unwrap());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hasher = PasswordHasher::new();
        let password = "correcthorse1";

        let hash1 = hasher.hash(password).unwrap();
        let hash2 = hasher.hash(password).unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify(password, &hash1).unwrap());
        assert!(hasher.verify(password, &hash2).unwrap());
    }

    #[test]
    fn test_hash_is_phc_format() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("testpassword1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_policy_valid_passwords() {
        assert!(PasswordPolicy::validate("password1").is_ok());
        assert!(PasswordPolicy::validate("Str0ngPass").is_ok());
        assert!(PasswordPolicy::validate("a1234567").is_ok());
    }

    #[test]
    fn test_policy_too_short() {
        let result = PasswordPolicy::validate("a1");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .contains(&"password does not meet the minimum length requirement"));
    }

    #[test]
    fn test_policy_with_config_respects_min_length() {
        let config = PasswordPolicyConfig {
            min_length: 12,
            require_letter: true,
            require_digit: true,
        };
        assert!(PasswordPolicy::validate_with_config("short1pass", &config).is_err());
        assert!(PasswordPolicy::validate_with_config("longenoughpass1", &config).is_ok());
    }

    #[test]
    fn test_policy_with_config_can_relax_digit_requirement() {
        let config = PasswordPolicyConfig {
            min_length: 8,
            require_letter: true,
            require_digit: false,
        };
        assert!(PasswordPolicy::validate_with_config("onlyletters", &config).is_ok());
    }

    #[test]
    fn test_policy_missing_letter() {
        let result = PasswordPolicy::validate("12345678");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .contains(&"password must contain at least one letter"));
    }

    #[test]
    fn test_policy_missing_digit() {
        let result = PasswordPolicy::validate("passwordonly");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .contains(&"password must contain at least one digit"));
    }

    #[test]
    fn test_policy_multiple_errors() {
        let result = PasswordPolicy::validate("abc");
        assert!(result.is_err());
        assert!(result.unwrap_err().len() > 1);
    }
}
