//! # API Layer
//!
//! The API layer handles HTTP request/response processing for authentication
//! endpoints. It bridges the HTTP world with the service layer.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            HTTP Request                                 │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Routes (routes.rs)                             │
//! │  Define URL patterns and HTTP methods, map to handlers                  │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Handlers (handlers.rs)                           │
//! │  1. Extract request data (JSON body, headers, path params)              │
//! │  2. Validate input using DTOs                                           │
//! │  3. Call service layer                                                  │
//! │  4. Transform response                                                  │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          DTOs (dto.rs)                                  │
//! │  - Request validation (serde, validator)                                │
//! │  - Response serialization                                               │
//! │  - API contract definitions                                             │
//! └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! | Module       | Responsibility                                      |
//! |--------------|-----------------------------------------------------|
//! | `routes`     | Route definitions with actix-web's `configure()`    |
//! | `handlers`   | Request handlers (extractors → service → response)  |
//! | `dto`        | Data Transfer Objects for request/response          |
//!
//! ## Endpoint Summary
//!
//! | Method | Path                                  | Handler                      | Auth  |
//! |--------|----------------------------------------|-------------------------------|-------|
//! | GET    | `/health`                              | `health_check`                | No    |
//! | POST   | `/api/v1/login`                       | `login_with_email`            | No    |
//! | POST   | `/api/v1/login-with-temp-token`       | `login_with_temp_token`       | No    |
//! | POST   | `/api/v1/signup`                      | `signup_with_email`           | No    |
//! | POST   | `/api/v1/verify-contact`              | `verify_contact`               | No    |
//! | POST   | `/api/v1/password-reset/request`      | `request_password_reset`      | No    |
//! | POST   | `/api/v1/password-reset/confirm`      | `reset_password`               | No    |
//! | POST   | `/api/v1/newsletter/unsubscribe`      | `unsubscribe_newsletter`       | No    |
//! | POST   | `/api/v1/session/switch-profile`      | `switch_profile`               | Yes   |
//! | POST   | `/api/v1/session/refresh`             | `refresh_token`                | Yes   |
//! | POST   | `/api/v1/session/logout`              | `logout`                        | Yes   |
//! | POST   | `/api/v1/session/change-password`     | `change_password`              | Yes   |
//! | POST   | `/api/v1/session/delete-account`      | `delete_account`                | Yes   |
//! | POST   | `/api/v1/admin/users`                 | `create_user`                   | Admin |
//! | GET    | `/api/v1/admin/users`                 | `find_non_participant_users`   | Admin |
//! | POST   | `/api/v1/admin/roles/add`             | `add_role_for_user`            | Admin |
//! | POST   | `/api/v1/admin/roles/remove`          | `remove_role_for_user`         | Admin |
//!
//! ## Related Documentation
//!
//! - Service layer: [`crate::service`]
//! - Error responses: [`shared::errors::ApiError`]
//! - Authentication middleware: [`shared::auth::middleware`]

pub mod dto;
pub mod handlers;
pub mod routes;
