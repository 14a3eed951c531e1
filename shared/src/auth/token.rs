//! # Opaque Token Generation
//!
//! Generates the opaque, high-entropy random values used for refresh tokens
//! (C2) and temp-tokens (C3). Unlike access tokens, these carry no claims —
//! they are random bytes, base64url-encoded, and are only ever looked up
//! against a store, never decoded.
//!
//! ## Why not JWTs?
//!
//! A refresh token or temp-token that could be decoded client-side would
//! leak its binding (user, purpose) without a store round-trip, and would
//! let a client forge its own expiry by construction. Keeping them opaque
//! means the store is the sole source of truth, which is exactly the
//! property the refresh-token ring (§9) depends on.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use shared::auth::token::generate_opaque_token;
//!
//! let refresh_token = generate_opaque_token(16); // 128 bits
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::RngCore;

/// Generates a cryptographically random, base64url-encoded (no padding)
/// opaque token of `byte_len` bytes of entropy.
///
/// `byte_len = 16` yields a 128-bit token, matching §4.2/§4.3.
pub fn generate_opaque_token(byte_len: usize) -> String {
    let mut bytes = vec![0u8; byte_len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_non_empty_token() {
        let token = generate_opaque_token(16);
        assert!(!token.is_empty());
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = generate_opaque_token(16);
        let b = generate_opaque_token(16);
        assert_ne!(a, b);
    }

    #[test]
    fn test_url_safe_alphabet_only() {
        let token = generate_opaque_token(16);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(!token.contains('='));
    }

    #[test]
    fn test_128_bit_token_length() {
        // 16 bytes base64url-no-pad encodes to ceil(16*8/6) = 22 chars.
        let token = generate_opaque_token(16);
        assert_eq!(token.len(), 22);
    }
}
