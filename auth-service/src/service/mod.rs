//! # Service Layer
//!
//! The service layer contains the core business logic for the identity
//! domain. It orchestrates between the repository layer (data access) and
//! the API layer (HTTP handling), and owns the one external collaborator
//! the domain talks to: the messaging service.
//!
//! ## Clean Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            API Layer                                    │
//! │                    (HTTP handlers, DTOs)                                │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//!                                 │ Calls service methods
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Service Layer                                  │
//! │  ┌─────────────────┐  ┌──────────────────────┐  ┌──────────────────┐   │
//! │  │   AuthService    │  │ VerificationService  │  │   AdminService    │   │
//! │  │ login, signup,   │  │ verify contact,       │  │ create user,      │   │
//! │  │ switch-profile,  │  │ password reset,       │  │ role mutation,    │   │
//! │  │ refresh, logout, │  │ newsletter unsub      │  │ staff audit       │   │
//! │  │ change-password, │  │                       │  │                   │   │
//! │  │ delete-account   │  │                       │  │                   │   │
//! │  └─────────────────┘  └──────────────────────┘  └──────────────────┘   │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//!                                 │ Uses repositories + MessagingClient
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Repository Layer          │    External Collaborator      │
//! │            (Data persistence)          │   (email delivery, reqwest)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Service Responsibilities
//!
//! | Service               | Operation                 | Side Effects                    |
//! |------------------------|---------------------------|----------------------------------|
//! | `AuthService`          | `login_with_email`        | Rotate refresh ring, last_login  |
//! | `AuthService`          | `signup_with_email`       | Create user, dispatch verify mail|
//! | `AuthService`          | `switch_profile`/`refresh`| Rotate refresh ring              |
//! | `VerificationService`  | `verify_contact`          | Confirm contact/account          |
//! | `VerificationService`  | `request/reset_password`  | Dispatch reset mail, clear ring  |
//! | `AdminService`         | `create_user`             | Create user with explicit roles  |
//! | `AdminService`         | `add/remove_role_for_user`| Idempotent role-set mutation     |
//!
//! ## Related Documentation
//!
//! - JWT handling: [`shared::auth::jwt`]
//! - Password hashing: [`shared::auth::password`]
//! - Repository: [`crate::repository`]

pub mod admin_service;
pub mod auth_service;
pub mod messaging_client;
pub mod verification_service;

pub use admin_service::AdminService;
pub use auth_service::AuthService;
pub use messaging_client::MessagingClient;
pub use verification_service::VerificationService;
