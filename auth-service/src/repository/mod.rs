//! # Repository Layer
//!
//! The repository layer provides data access abstractions for the identity
//! domain. It encapsulates all database operations, hiding SQL complexity
//! from the service layer.
//!
//! ## Clean Architecture Principles
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Service Layer                                  │
//! │                    (Business logic, validation)                         │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//!                                 │ Uses repository structs directly
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Repository Layer                                 │
//! │  ┌────────────────────────────┐  ┌────────────────────────────────┐     │
//! │  │       UserRepository       │  │     TempTokenRepository        │     │
//! │  │  - add_user                │  │  - add                         │     │
//! │  │  - get_by_account_id/_id   │  │  - get_by_token                │     │
//! │  │  - update_user             │  │  - delete_by_token             │     │
//! │  │  - push/remove_refresh_tok │  │  - delete_all_of_user          │     │
//! │  │  - update_last_login/_refr │  │  - purge_expired                │     │
//! │  │  - delete_user             │  │                                 │     │
//! │  │  - find_non_participant    │  │                                 │     │
//! │  └────────────────────────────┘  └────────────────────────────────┘     │
//! └───────────────────────────────────┬─────────────────────────────────────┘
//!                                     │
//!                                     │ sqlx queries
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         PostgreSQL Database                             │
//! │                    users  │  temp_tokens                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Decisions
//!
//! 1. **Concrete structs, not traits**: mirrors the teacher's choice —
//!    traits can be introduced later if a second backend is ever needed.
//!
//! 2. **Connection Pool**: each repository holds a `PgPool` clone (`Arc`
//!    internally) for cheap sharing across Actix-web workers.
//!
//! 3. **Tenant scoping**: every `UserRepository` method that can be scoped
//!    by tenant takes `instance_id` explicitly — there is no ambient tenant
//!    context (§9).
//!
//! 4. **Error Handling**: database errors are mapped to
//!    [`shared::errors::ApiError`] for consistent HTTP responses.
//!
//! ## Related Documentation
//!
//! - Database schema: `migrations/0001_initial.sql`
//! - Error handling: [`shared::errors`]
//! - Connection pool: [`shared::database`]

pub mod temp_token_repository;
pub mod user_repository;

pub use temp_token_repository::TempTokenRepository;
pub use user_repository::UserRepository;
