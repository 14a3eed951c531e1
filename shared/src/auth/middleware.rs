//! # Authentication Extractor for Actix-web
//!
//! Extracts and validates access tokens from HTTP requests, producing an
//! [`AuthenticatedUser`] handlers can take as a parameter.
//!
//! ## Overview
//!
//! | Component | Purpose | Usage |
//! |-----------|---------|-------|
//! | [`AuthMiddleware`] | Extract and validate the access token | Applied once per request |
//! | [`AuthenticatedUser`] | Extractor for handlers | Get the current user in handlers |
//! | [`RequireRole`] | `ADMIN` guard | Restrict admin-only routes |
//!
//! ## Authentication Flow
//!
//! ```text
//! ┌─────────┐     ┌──────────────┐     ┌─────────────┐     ┌─────────┐
//! │ Request │────►│ AuthMiddleware│────►│ Extract token│────►│ Validate│
//! └─────────┘     └──────────────┘     └─────────────┘     └────┬────┘
//!                                                                │
//!                 ┌──────────────┐     ┌─────────────┐          │
//!                 │   Handler    │◄────│ Insert User │◄─────────┘
//!                 │(AuthenticUser)│     │ Extension   │     (if valid)
//!                 └──────────────┘     └─────────────┘
//! ```
//!
//! ## Roles
//!
//! Unlike a hierarchical permission model, roles here are a flat set of
//! strings carried in the access token. The only role the service
//! currently gates on is `ADMIN`; any other string is transported but not
//! otherwise interpreted by this layer.
//!
//! ## Usage Example
//!
//! ### Setup Middleware
//!
//! ```rust,ignore
//! use shared::auth::{AuthMiddleware, JwtService};
//! use std::sync::Arc;
//!
//! let jwt_service = Arc::new(JwtService::new(config.jwt));
//! let auth_middleware = AuthMiddleware::new(jwt_service);
//!
//! App::new()
//!     .service(
//!         web::scope("/api")
//!             .wrap(auth_middleware)
//!             .route("/profile", web::get().to(get_profile))
//!     )
//! ```
//!
//! ### Use in Handlers
//!
//! ```rust,ignore
//! use shared::auth::AuthenticatedUser;
//!
//! async fn get_profile(user: AuthenticatedUser) -> impl Responder {
//!     format!("Hello, {}!", user.user_id)
//! }
//! ```
//!
//! ### Role-Based Guards
//!
//! ```rust,ignore
//! use shared::auth::RequireRole;
//!
//! #[get("/admin/users", guard = "RequireRole::admin")]
//! async fn list_users(user: AuthenticatedUser) -> impl Responder {
//!     // Only reaches here if `ADMIN` is in the token's role set
//! }
//! ```
//!
//! ## Related Documentation
//!
//! - [`crate::auth::jwt`] - Access-token validation
//! - [`crate::errors::ApiError`] - Authentication errors

use crate::auth::jwt::{Claims, JwtService};
use crate::errors::ApiError;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{web, Error, HttpMessage};
use std::sync::Arc;
use uuid::Uuid;

// =============================================================================
// Authenticated User
// =============================================================================

/// An authenticated user extracted from a verified access token.
///
/// This struct is inserted into request extensions after successful
/// authentication and can be extracted in handlers as a parameter.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// The user's unique identifier (from the `sub` claim).
    pub user_id: Uuid,
    /// The tenant this token is scoped to. Repository calls made on behalf
    /// of this user must be restricted to this instance.
    pub instance_id: String,
    /// Role strings held at token issuance time.
    pub roles: Vec<String>,
    /// The profile this session is currently acting as.
    pub selected_profile_id: Uuid,
    /// Mirrors `account.accountConfirmedAt > 0` at issuance time.
    pub account_confirmed: bool,
}

impl AuthenticatedUser {
    /// Returns `true` if `ADMIN` is present among the token's role strings
    /// (checked against claims, not a live user-document read).
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == "ADMIN")
    }
}

/// Converts validated access-token claims to an authenticated user.
impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            instance_id: claims.instance_id,
            roles: claims.roles,
            selected_profile_id: claims.selected_profile_id,
            account_confirmed: claims.account_confirmed,
        }
    }
}

// =============================================================================
// Auth Middleware
// =============================================================================

/// Middleware helper for access-token authentication.
///
/// 1. Extracts the token from the `Authorization` header
/// 2. Validates the signature and expiry
/// 3. Inserts the authenticated user into request extensions
///
/// ## Setup
///
/// ```rust,ignore
/// let jwt_service = Arc::new(JwtService::new(config.jwt));
/// let auth = AuthMiddleware::new(jwt_service);
///
/// App::new()
///     .service(
///         web::scope("/api")
///             .wrap(auth)
///             .route("/protected", web::get().to(handler))
///     )
/// ```
#[derive(Clone)]
pub struct AuthMiddleware {
    jwt_service: Arc<JwtService>,
}

impl AuthMiddleware {
    /// Creates a new authentication middleware.
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self { jwt_service }
    }

    /// Extracts and validates the user from a request.
    ///
    /// ## Errors
    ///
    /// Returns `ApiError::InvalidToken` if the header is missing, malformed,
    /// the token's signature is invalid, or it has expired — all collapse
    /// to the same wire string so callers can't distinguish "no token"
    /// from "bad token".
    pub fn extract_user(&self, req: &ServiceRequest) -> Result<AuthenticatedUser, ApiError> {
        let auth_header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::InvalidToken)?;

        let token = JwtService::extract_from_header(auth_header)?;
        let claims = self.jwt_service.validate_access_token(token)?;

        Ok(AuthenticatedUser::from(claims))
    }

    /// Authenticates a request and stores the user in extensions.
    ///
    /// The user then becomes available via the `AuthenticatedUser` extractor.
    pub fn authenticate(&self, req: &ServiceRequest) -> Result<(), ApiError> {
        let user = self.extract_user(req)?;
        req.extensions_mut().insert(user);
        Ok(())
    }
}

/// `from_fn` middleware that authenticates a scope's requests and inserts
/// an [`AuthenticatedUser`] into request extensions before the inner
/// service runs. Expects `web::Data<Arc<JwtService>>` to be registered as
/// app data; the `JwtService` itself holds no per-request mutable state.
///
/// ```rust,ignore
/// App::new()
///     .app_data(web::Data::new(jwt_service.clone()))
///     .service(
///         web::scope("/session")
///             .wrap(actix_web::middleware::from_fn(auth_guard))
///             .route("/refresh", web::post().to(refresh_token))
///     )
/// ```
pub async fn auth_guard(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let jwt_service = req
        .app_data::<web::Data<Arc<JwtService>>>()
        .expect("JwtService must be registered as app_data")
        .get_ref()
        .clone();
    let middleware = AuthMiddleware::new(jwt_service);

    match middleware.authenticate(&req) {
        Ok(()) => next.call(req).await,
        Err(error) => Err(error.into()),
    }
}

// =============================================================================
// Actix-web Extractor
// =============================================================================

/// Extractor for getting the authenticated user in handlers.
///
/// ## Errors
///
/// Returns `ApiError::InvalidToken` if no user is in request extensions
/// (authentication middleware wasn't applied, or the token was rejected).
impl actix_web::FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = std::future::Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::InvalidToken.into());

        std::future::ready(result)
    }
}

// =============================================================================
// Role Guards
// =============================================================================

/// Route guard for the `ADMIN` role.
///
/// ## Example
///
/// ```rust,ignore
/// use actix_web::get;
/// use shared::auth::{RequireRole, AuthenticatedUser};
///
/// #[get("/admin/users", guard = "RequireRole::admin")]
/// async fn list_users(user: AuthenticatedUser) -> impl Responder {
///     "admin-only resource"
/// }
/// ```
pub struct RequireRole;

impl RequireRole {
    /// Guard that requires `ADMIN` among the token's role strings.
    pub fn admin(req: &actix_web::guard::GuardContext) -> bool {
        req.req_data()
            .get::<AuthenticatedUser>()
            .map(|user| user.is_admin())
            .unwrap_or(false)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_claims(roles: Vec<String>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            instance_id: "instance-1".to_string(),
            roles,
            selected_profile_id: Uuid::new_v4(),
            other_profile_ids: vec![],
            account_confirmed: true,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_authenticated_user_from_claims() {
        let claims = test_claims(vec!["PARTICIPANT".to_string()]);
        let user = AuthenticatedUser::from(claims.clone());

        assert_eq!(user.user_id, claims.sub);
        assert_eq!(user.instance_id, claims.instance_id);
        assert_eq!(user.selected_profile_id, claims.selected_profile_id);
        assert!(user.account_confirmed);
    }

    #[test]
    fn test_is_admin_true_when_role_present() {
        let user = AuthenticatedUser::from(test_claims(vec![
            "PARTICIPANT".to_string(),
            "ADMIN".to_string(),
        ]));
        assert!(user.is_admin());
    }

    #[test]
    fn test_is_admin_false_when_role_absent() {
        let user = AuthenticatedUser::from(test_claims(vec!["PARTICIPANT".to_string()]));
        assert!(!user.is_admin());
    }

    #[test]
    fn test_is_admin_false_when_no_roles() {
        let user = AuthenticatedUser::from(test_claims(vec![]));
        assert!(!user.is_admin());
    }
}
