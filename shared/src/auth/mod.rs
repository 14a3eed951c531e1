//! # Authentication and Authorization Module
//!
//! This module provides all authentication and authorization functionality
//! for the identity service: the password hasher (C1), the access-token
//! codec and opaque-token generator (C2), and the Actix-web extractor that
//! turns a verified access token into an [`AuthenticatedUser`] for handlers
//! (part of C8's role predicate machinery).
//!
//! ## Module Structure
//!
//! ```text
//! auth/
//! ├── jwt.rs        - Signed access-token minting/validation (C2)
//! ├── token.rs       - Opaque refresh-token / temp-token generation (C2/C3)
//! ├── password.rs   - Argon2id password hashing + strength policy (C1)
//! └── middleware.rs - Actix-web extractor + ADMIN role guard (C8)
//! ```
//!
//! ## Overview
//!
//! | Component | Purpose |
//! |-----------|---------|
//! | [`JwtService`] | Mint/validate signed access tokens |
//! | [`generate_opaque_token`] | CSPRNG-backed refresh/temp-token values |
//! | [`PasswordHasher`] | Argon2id password hashing |
//! | [`AuthenticatedUser`] | Extractor carrying verified claims into handlers |
//!
//! ## Token Flow
//!
//! ```text
//! ┌────────┐        ┌────────────┐        ┌────────────┐
//! │ Client │        │ Auth API   │        │ Protected  │
//! └───┬────┘        └─────┬──────┘        │    API     │
//!     │                   │               └─────┬──────┘
//!     │ POST /login       │                     │
//!     │ (email, password) │                     │
//!     │──────────────────>│                     │
//!     │                   │                     │
//!     │ {accessToken,     │                     │
//!     │  refreshToken}    │                     │
//!     │<──────────────────│                     │
//!     │                   │                     │
//!     │ GET /resource     │                     │
//!     │ Authorization:    │                     │
//!     │ Bearer <access>   │                     │
//!     │────────────────────────────────────────>│
//!     │                   │                     │
//!     │ 200 OK {data}     │                     │
//!     │<────────────────────────────────────────│
//!     │                   │                     │
//!     │ (after access-token TTL)                │
//!     │ POST /refresh     │                     │
//!     │ (refreshToken)    │                     │
//!     │──────────────────>│                     │
//!     │                   │                     │
//!     │ {new accessToken, │                     │
//!     │  new refreshToken}│                     │
//!     │<──────────────────│                     │
//! ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod token;

// Re-export main types for convenient access
pub use jwt::{Claims, JwtService};
pub use middleware::{AuthMiddleware, AuthenticatedUser};
pub use password::{PasswordHasher, PasswordPolicy};
pub use token::generate_opaque_token;
