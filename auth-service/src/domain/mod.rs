//! # Domain Layer
//!
//! The domain layer contains the core business entities and domain events
//! for the identity service. This layer is **framework-agnostic** and
//! represents the heart of the business logic.
//!
//! ## Clean Architecture Principles
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                         Domain Layer                              │
//! │  ┌─────────────────────────────────────────────────────────────┐  │
//! │  │                       Entities                              │  │
//! │  │  - User: account + roles + profiles + contact infos         │  │
//! │  │  - Account: credential record, refresh-token ring           │  │
//! │  │  - Profile / ContactInfo / ContactPreferences                │  │
//! │  │  - UserProfileView: safe projection for API responses       │  │
//! │  │  - TempToken: single-use, purpose-scoped credential         │  │
//! │  └─────────────────────────────────────────────────────────────┘  │
//! │                                                                   │
//! │  ┌─────────────────────────────────────────────────────────────┐  │
//! │  │                     Domain Events                           │  │
//! │  │  - UserRegistered: signup or admin-create completes         │  │
//! │  │  - UserLoggedIn: password or temp-token login succeeds      │  │
//! │  │  - ProfileSwitched: SwitchProfile mints a new token pair     │  │
//! │  │  - ContactVerified: VerifyContact applies a verification    │  │
//! │  │  - PasswordChanged: password changed or reset completes     │  │
//! │  └─────────────────────────────────────────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Structure
//!
//! | Module     | Purpose                                           |
//! |------------|---------------------------------------------------|
//! | `entities` | Core domain entities mapped to database tables    |
//! | `events`   | Domain events logged as structured payloads       |
//!
//! ## Design Decisions
//!
//! 1. **Entities vs DTOs**: Domain entities contain all database fields,
//!    while separate DTOs in the API layer handle request/response
//!    transformation, matching the original system's request/response
//!    message shapes.
//!
//! 2. **Multi-tenancy**: every entity that can be looked up carries an
//!    `instance_id`; there is no ambient tenant context (§9).
//!
//! 3. **`FromRow`**: `User` and `TempToken` hand-roll `FromRow` to unwrap
//!    their `jsonb` columns through `sqlx::types::Json` — the derive macro
//!    has no attribute for that.
//!
//! ## Related Documentation
//!
//! - Database schema: `migrations/0001_initial.sql`

pub mod entities;
pub mod events;

pub use entities::*;
