//! # Route Configuration
//!
//! Defines URL patterns and maps them to handler functions.
//!
//! ## Route Structure
//!
//! ```text
//! /
//! ├── health                              GET  → health_check
//! │
//! └── api/v1/
//!     ├── login                           POST → login_with_email
//!     ├── login-with-temp-token           POST → login_with_temp_token
//!     ├── signup                          POST → signup_with_email
//!     ├── verify-contact                  POST → verify_contact
//!     ├── password-reset/request          POST → request_password_reset
//!     ├── password-reset/confirm          POST → reset_password
//!     ├── newsletter/unsubscribe          POST → unsubscribe_newsletter
//!     │
//!     ├── session/                        (requires Authorization: Bearer)
//!     │   ├── switch-profile              POST → switch_profile
//!     │   ├── refresh                     POST → refresh_token
//!     │   ├── logout                      POST → logout
//!     │   ├── change-password             POST → change_password
//!     │   └── delete-account              POST → delete_account
//!     │
//!     └── admin/                          (requires Authorization: Bearer + ADMIN role)
//!         ├── users                       POST → create_user
//!         ├── users                       GET  → find_non_participant_users
//!         ├── roles/add                   POST → add_role_for_user
//!         └── roles/remove                POST → remove_role_for_user
//! ```
//!
//! ## Authentication
//!
//! The `session` and `admin` scopes are wrapped with
//! [`shared::auth::middleware::auth_guard`], which populates the
//! [`AuthenticatedUser`](shared::auth::middleware::AuthenticatedUser)
//! extractor used by every handler in those scopes. Admin handlers perform
//! an additional `ADMIN`-role check against the extracted user themselves.
//!
//! ## Related Documentation
//!
//! - Handler implementations: [`super::handlers`]
//! - Auth middleware: [`shared::auth::middleware`]

use actix_web::{middleware::from_fn, web};
use shared::auth::middleware::auth_guard;

use super::handlers;

/// Configures all routes for the identity service.
///
/// Called from `main.rs` during app initialization:
///
/// ```rust,ignore
/// App::new()
///     .configure(routes::configure)
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health_check)).service(
        web::scope("/api/v1")
            // ─────────────────────────────────────────────────────────
            // Public (no authentication required)
            // ─────────────────────────────────────────────────────────
            .route("/login", web::post().to(handlers::login_with_email))
            .route(
                "/login-with-temp-token",
                web::post().to(handlers::login_with_temp_token),
            )
            .route("/signup", web::post().to(handlers::signup_with_email))
            .route("/verify-contact", web::post().to(handlers::verify_contact))
            .route(
                "/password-reset/request",
                web::post().to(handlers::request_password_reset),
            )
            .route(
                "/password-reset/confirm",
                web::post().to(handlers::reset_password),
            )
            .route(
                "/newsletter/unsubscribe",
                web::post().to(handlers::unsubscribe_newsletter),
            )
            // ─────────────────────────────────────────────────────────
            // Authenticated session lifecycle
            // ─────────────────────────────────────────────────────────
            .service(
                web::scope("/session")
                    .wrap(from_fn(auth_guard))
                    .route("/switch-profile", web::post().to(handlers::switch_profile))
                    .route("/refresh", web::post().to(handlers::refresh_token))
                    .route("/logout", web::post().to(handlers::logout))
                    .route("/change-password", web::post().to(handlers::change_password))
                    .route("/delete-account", web::post().to(handlers::delete_account)),
            )
            // ─────────────────────────────────────────────────────────
            // Admin (authenticated + `ADMIN` role, checked in-handler)
            // ─────────────────────────────────────────────────────────
            .service(
                web::scope("/admin")
                    .wrap(from_fn(auth_guard))
                    .route("/users", web::post().to(handlers::create_user))
                    .route("/users", web::get().to(handlers::find_non_participant_users))
                    .route("/roles/add", web::post().to(handlers::add_role_for_user))
                    .route("/roles/remove", web::post().to(handlers::remove_role_for_user)),
            ),
    );
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use shared::auth::jwt::JwtService;
    use shared::config::JwtConfig;
    use sqlx::PgPool;
    use std::sync::Arc;

    fn jwt_service_data() -> web::Data<Arc<JwtService>> {
        web::Data::new(Arc::new(JwtService::new(JwtConfig {
            secret: "test_secret_key_minimum_32_chars_required".to_string(),
            access_token_ttl_seconds: 900,
            token_minimum_age_seconds: 30,
        })))
    }

    fn db_pool_data() -> web::Data<PgPool> {
        // Lazy pool: no connection attempt until a query actually runs, so
        // this doesn't require a live database for routes that never touch it.
        web::Data::new(PgPool::connect_lazy("postgres://localhost/nonexistent").unwrap())
    }

    #[actix_web::test]
    async fn test_health_route_responds() {
        // The lazy pool has no live backend, so `/health` is expected to
        // surface `ServiceUnavailable` rather than panic or hang — this
        // exercises the route wiring, not database connectivity.
        let app = test::init_service(App::new().app_data(db_pool_data()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 503);
    }

    #[actix_web::test]
    async fn test_session_scope_rejects_missing_token() {
        let app =
            test::init_service(App::new().app_data(jwt_service_data()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/session/logout")
            .set_json(serde_json::json!({ "refreshToken": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }
}
