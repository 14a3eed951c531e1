//! # Identity Service — Auth Service Binary
//!
//! The **auth-service** is the account-management service for a
//! multi-tenant health-research platform: it owns the authentication state
//! machine, the per-tenant user store, the temp-token taxonomy used by
//! every unauthenticated verification flow, and the administrative surface
//! over a tenant's non-participant users.
//!
//! ## Architecture Overview
//!
//! This service follows **Clean Architecture** principles with clear
//! separation between layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        HTTP Layer (api/)                        │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐ │
//! │  │   routes    │  │  handlers   │  │    DTOs (Request/Res)   │ │
//! │  └──────┬──────┘  └──────┬──────┘  └────────────┬────────────┘ │
//! └─────────┼────────────────┼─────────────────────┼───────────────┘
//!           │                │                      │
//!           ▼                ▼                      ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Service Layer (service/)                     │
//! │  ┌────────────────┐ ┌───────────────────────┐ ┌───────────────┐ │
//! │  │  AuthService   │ │ VerificationService   │ │ AdminService   │ │
//! │  └───────┬────────┘ └───────────┬────────────┘ └──────┬────────┘ │
//! └──────────┼──────────────────────┼──────────────────────┼─────────┘
//!            │                      │                      │
//!            ▼                      ▼                      ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  Repository Layer (repository/)                 │
//! │  ┌───────────────────────────┐ ┌───────────────────────────────┐│
//! │  │      UserRepository        │ │     TempTokenRepository      ││
//! │  └───────────────────────────┘ └───────────────────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Domain Layer (domain/)                       │
//! │  ┌──────────────┐  ┌───────────────┐  ┌─────────────────────┐   │
//! │  │   Entities   │  │ Value Objects │  │   Domain Events     │   │
//! │  └──────────────┘  └───────────────┘  └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## API Endpoints
//!
//! All endpoints are prefixed with `/api/v1` (see [`api::routes`] for the
//! full route table):
//!
//! | Method | Endpoint                           | Auth  |
//! |--------|-------------------------------------|-------|
//! | POST   | `/login`                            | No    |
//! | POST   | `/login-with-temp-token`            | No    |
//! | POST   | `/signup`                           | No    |
//! | POST   | `/verify-contact`                   | No    |
//! | POST   | `/password-reset/request`           | No    |
//! | POST   | `/password-reset/confirm`           | No    |
//! | POST   | `/newsletter/unsubscribe`           | No    |
//! | POST   | `/session/switch-profile`           | Yes   |
//! | POST   | `/session/refresh`                  | Yes   |
//! | POST   | `/session/logout`                   | Yes   |
//! | POST   | `/session/change-password`          | Yes   |
//! | POST   | `/session/delete-account`           | Yes   |
//! | POST   | `/admin/users`                      | Admin |
//! | GET    | `/admin/users`                      | Admin |
//! | POST   | `/admin/roles/add`                  | Admin |
//! | POST   | `/admin/roles/remove`               | Admin |
//!
//! ## Health Check
//!
//! | Method | Endpoint  | Description                                    |
//! |--------|-----------|-------------------------------------------------|
//! | GET    | `/health` | `SELECT 1` against the database pool            |
//!
//! ## Security Features
//!
//! - **Password hashing**: Argon2id with OWASP-recommended parameters.
//! - **Access tokens**: short-lived signed JWTs (HS256); refresh tokens are
//!   opaque, CSPRNG-generated values held in a per-account ring, never JWTs.
//! - **Anti-enumeration**: login runs a real password verification against
//!   a dummy hash on the miss path, so "no such account" and "wrong
//!   password" take the same time.
//! - There are no process-wide mutable caches — every handler is stateless
//!   beyond immutable configuration and the signing secret.
//!
//! ## Configuration
//!
//! Environment variables are loaded via [`shared::config::AppConfig`]. Key
//! settings for auth-service:
//!
//! - `SERVICE_NAME` / `APP_SERVICE_NAME` — service name for tracing
//! - `DATABASE_URL` / `APP_DATABASE__URL` — Postgres connection string
//! - `JWT_SECRET` / `APP_JWT__SECRET` — HS256 signing secret (32+ chars)
//! - `APP_MESSAGING__BASE_URL` — base URL of the email-delivery collaborator
//!
//! ## Related Documentation
//!
//! - Authentication design: [`shared::auth`]
//! - JWT implementation: [`shared::auth::jwt`]
//! - Password security: [`shared::auth::password`]

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use shared::{
    auth::{jwt::JwtService, password::PasswordHasher},
    config::AppConfig,
    database, tracing_config,
};
use std::sync::Arc;
use tracing::info;

mod api;
mod domain;
mod repository;
mod service;

use api::routes;
use repository::{TempTokenRepository, UserRepository};
use service::{AdminService, AuthService, MessagingClient, VerificationService};

/// Application entry point and server initialization.
///
/// # Initialization Sequence
///
/// 1. Load configuration from environment variables
/// 2. Initialize structured logging/tracing
/// 3. Create the PostgreSQL connection pool
/// 4. Build the shared collaborators (JWT service, password hasher,
///    messaging client) and the repositories that sit on the pool
/// 5. Instantiate the three services with their dependencies
/// 6. Configure and start the HTTP server
///
/// # Error Handling
///
/// The main function uses `expect()` for critical initialization errors
/// that should prevent the service from starting (fail-fast pattern).
///
/// # Graceful Shutdown
///
/// Actix-web handles SIGTERM/SIGINT signals and gracefully shuts down:
/// stops accepting new connections, waits for in-flight requests to
/// complete, then closes the database pool.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // ─────────────────────────────────────────────────────────────────────
    // Step 1: Load configuration from environment
    // ─────────────────────────────────────────────────────────────────────
    let config = AppConfig::from_env().expect("Failed to load configuration");

    // ─────────────────────────────────────────────────────────────────────
    // Step 2: Initialize structured logging
    // ─────────────────────────────────────────────────────────────────────
    tracing_config::init_tracing(&config.service_name, config.is_production());

    info!(
        service = %config.service_name,
        host = %config.server.host,
        port = %config.server.port,
        "Starting auth-service"
    );

    // ─────────────────────────────────────────────────────────────────────
    // Step 3: Create PostgreSQL connection pool
    // ─────────────────────────────────────────────────────────────────────
    let db_pool = database::create_pool(&config.database)
        .await
        .expect("Failed to create database pool");

    // Run migrations (optional in production — typically applied out of
    // band as part of deployment):
    // sqlx::migrate!("../migrations").run(&db_pool).await.expect("Failed to run migrations");

    // ─────────────────────────────────────────────────────────────────────
    // Step 4: Build collaborators and repositories
    // ─────────────────────────────────────────────────────────────────────
    let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
    let password_hasher = PasswordHasher::new();
    let messaging = Arc::new(MessagingClient::new(&config.messaging));

    let user_repository = UserRepository::new(db_pool.clone());
    let temp_token_repository = TempTokenRepository::new(db_pool.clone());

    // ─────────────────────────────────────────────────────────────────────
    // Step 5: Instantiate services with dependencies
    // ─────────────────────────────────────────────────────────────────────
    let auth_service = web::Data::new(AuthService::new(
        user_repository.clone(),
        temp_token_repository.clone(),
        jwt_service.clone(),
        password_hasher.clone(),
        messaging.clone(),
        config.password_policy.clone(),
        config.temp_token.clone(),
    ));
    let verification_service = web::Data::new(VerificationService::new(
        user_repository.clone(),
        temp_token_repository,
        password_hasher.clone(),
        messaging,
        config.password_policy.clone(),
        config.temp_token.clone(),
    ));
    let admin_service = web::Data::new(AdminService::new(
        user_repository,
        password_hasher,
        config.password_policy.clone(),
    ));

    // `auth_guard` (wrapped around the `/session` and `/admin` scopes)
    // looks this up as `web::Data<Arc<JwtService>>`, distinct from the
    // `Arc<JwtService>` each service already holds internally.
    let jwt_service_data = web::Data::new(jwt_service);
    let db_pool_data = web::Data::new(db_pool);

    // ─────────────────────────────────────────────────────────────────────
    // Step 6: Configure and start HTTP server
    // ─────────────────────────────────────────────────────────────────────
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    info!("Server listening on {}:{}", server_host, server_port);

    HttpServer::new(move || {
        // In production, replace `allow_any_origin()` with specific
        // allowed origins from configuration:
        // ```rust
        // Cors::default()
        //     .allowed_origin("https://app.example.com")
        // ```
        let cors = Cors::default()
            .allow_any_origin() // TODO: Configure specific origins for production
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            // ─────────────────────────────────────────────────────────
            // Middleware Stack (order matters: first added = last executed)
            // ─────────────────────────────────────────────────────────
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            // ─────────────────────────────────────────────────────────
            // Shared State
            // ─────────────────────────────────────────────────────────
            .app_data(auth_service.clone())
            .app_data(verification_service.clone())
            .app_data(admin_service.clone())
            .app_data(jwt_service_data.clone())
            .app_data(db_pool_data.clone())
            // ─────────────────────────────────────────────────────────
            // Routes Configuration
            // ─────────────────────────────────────────────────────────
            .configure(routes::configure)
    })
    .bind((server_host, server_port))?
    .run()
    .await
}
