//! # HTTP Handlers
//!
//! Each handler follows the same shape: extract → validate → call service →
//! map the result onto an HTTP response. Handlers never touch the
//! repository layer directly and never construct `ApiError` variants that
//! belong to the service layer's domain logic — their own error surface is
//! limited to request-shape validation and role gating.
//!
//! Non-admin handlers validate with [`shared::validation::validate_request`]
//! (folds into the `"missing arguments"` wire string). Admin handlers
//! validate by hand via each DTO's `is_structurally_valid()`, returning the
//! same `ApiError::MissingArguments` — and they do so *before* the role
//! check, so a malformed admin request always reports the field problem
//! rather than a misleading `permission denied`.

use actix_web::{web, HttpResponse};
use shared::auth::middleware::AuthenticatedUser;
use shared::errors::{ApiError, ApiResult};
use shared::validation::validate_request;
use sqlx::PgPool;

use crate::api::dto::{
    AckResponse, ChangePasswordRequest, CreateUserRequest, DeleteAccountRequest,
    FindNonParticipantUsersQuery, LoginWithEmailRequest, LoginWithTempTokenRequest, LogoutRequest,
    RefreshTokenRequest, RequestPasswordResetRequest, ResetPasswordRequest, RoleMutationRequest,
    SignupWithEmailRequest, SwitchProfileRequest, UnsubscribeNewsletterRequest,
    VerifyContactRequest,
};
use crate::service::{AdminService, AuthService, VerificationService};

// =============================================================================
// Health Check
// =============================================================================

pub async fn health_check(pool: web::Data<PgPool>) -> HttpResponse {
    match shared::database::health_check(&pool).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })),
        Err(error) => {
            tracing::error!(%error, "health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({ "status": "unavailable" }))
        }
    }
}

// =============================================================================
// Login / Signup
// =============================================================================

pub async fn login_with_email(
    auth_service: web::Data<AuthService>,
    body: web::Json<LoginWithEmailRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    let pair = auth_service
        .login_with_email(&body.instance_id, &body.email, &body.password, body.as_participant)
        .await?;

    Ok(HttpResponse::Ok().json(pair))
}

pub async fn login_with_temp_token(
    auth_service: web::Data<AuthService>,
    body: web::Json<LoginWithTempTokenRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    let pair = auth_service.login_with_temp_token(&body.token).await?;

    Ok(HttpResponse::Ok().json(pair))
}

pub async fn signup_with_email(
    auth_service: web::Data<AuthService>,
    body: web::Json<SignupWithEmailRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    let pair = auth_service
        .signup_with_email(&body.instance_id, &body.email, &body.password, &body.preferred_language)
        .await?;

    Ok(HttpResponse::Created().json(pair))
}

// =============================================================================
// Session Lifecycle (authenticated)
// =============================================================================

pub async fn switch_profile(
    auth_service: web::Data<AuthService>,
    user: AuthenticatedUser,
    body: web::Json<SwitchProfileRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    let pair = auth_service
        .switch_profile(&user, body.profile_id, &body.refresh_token)
        .await?;

    Ok(HttpResponse::Ok().json(pair))
}

pub async fn refresh_token(
    auth_service: web::Data<AuthService>,
    user: AuthenticatedUser,
    body: web::Json<RefreshTokenRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    let pair = auth_service.refresh_token(&user, &body.refresh_token).await?;

    Ok(HttpResponse::Ok().json(pair))
}

pub async fn logout(
    auth_service: web::Data<AuthService>,
    user: AuthenticatedUser,
    body: web::Json<LogoutRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    auth_service.logout(&user, &body.refresh_token).await?;

    Ok(HttpResponse::Ok().json(AckResponse::default()))
}

// =============================================================================
// Account Lifecycle (authenticated, supplemental)
// =============================================================================

pub async fn change_password(
    auth_service: web::Data<AuthService>,
    user: AuthenticatedUser,
    body: web::Json<ChangePasswordRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    auth_service
        .change_password(&user, &body.old_password, &body.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(AckResponse::default()))
}

pub async fn delete_account(
    auth_service: web::Data<AuthService>,
    user: AuthenticatedUser,
    body: web::Json<DeleteAccountRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    auth_service.delete_account(&user, &body.password).await?;

    Ok(HttpResponse::Ok().json(AckResponse::default()))
}

// =============================================================================
// Verification (unauthenticated, temp-token-mediated)
// =============================================================================

pub async fn verify_contact(
    verification_service: web::Data<VerificationService>,
    body: web::Json<VerifyContactRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    let result = verification_service.verify_contact(&body.token).await?;

    Ok(HttpResponse::Ok().json(result))
}

pub async fn request_password_reset(
    verification_service: web::Data<VerificationService>,
    body: web::Json<RequestPasswordResetRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    verification_service
        .request_password_reset(&body.instance_id, &body.email)
        .await?;

    Ok(HttpResponse::Ok().json(AckResponse::default()))
}

pub async fn reset_password(
    verification_service: web::Data<VerificationService>,
    body: web::Json<ResetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    verification_service
        .reset_password(&body.token, &body.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(AckResponse::default()))
}

pub async fn unsubscribe_newsletter(
    verification_service: web::Data<VerificationService>,
    body: web::Json<UnsubscribeNewsletterRequest>,
) -> ApiResult<HttpResponse> {
    validate_request(&body)?;

    verification_service.unsubscribe_newsletter(&body.token).await?;

    Ok(HttpResponse::Ok().json(AckResponse::default()))
}

// =============================================================================
// Admin (authenticated, `ADMIN` role required)
// =============================================================================

/// Returns `ApiError::PermissionDenied` unless the caller's access token
/// carries the `ADMIN` role. Checked against claims, not a live user read.
fn require_admin(user: &AuthenticatedUser) -> Result<(), ApiError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::PermissionDenied)
    }
}

pub async fn create_user(
    admin_service: web::Data<AdminService>,
    user: AuthenticatedUser,
    body: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    if !body.is_structurally_valid() {
        return Err(ApiError::MissingArguments);
    }

    require_admin(&user)?;

    let created = admin_service
        .create_user(
            &user.instance_id,
            &body.account_id,
            &body.initial_password,
            body.roles.clone(),
            &body.preferred_language,
        )
        .await?;

    Ok(HttpResponse::Created().json(created))
}

pub async fn add_role_for_user(
    admin_service: web::Data<AdminService>,
    user: AuthenticatedUser,
    body: web::Json<RoleMutationRequest>,
) -> ApiResult<HttpResponse> {
    if !body.is_structurally_valid() {
        return Err(ApiError::MissingArguments);
    }

    require_admin(&user)?;

    admin_service
        .add_role_for_user(&user.instance_id, body.user_id, &body.role)
        .await?;

    Ok(HttpResponse::Ok().json(AckResponse::default()))
}

pub async fn remove_role_for_user(
    admin_service: web::Data<AdminService>,
    user: AuthenticatedUser,
    body: web::Json<RoleMutationRequest>,
) -> ApiResult<HttpResponse> {
    if !body.is_structurally_valid() {
        return Err(ApiError::MissingArguments);
    }

    require_admin(&user)?;

    admin_service
        .remove_role_for_user(&user.instance_id, body.user_id, &body.role)
        .await?;

    Ok(HttpResponse::Ok().json(AckResponse::default()))
}

pub async fn find_non_participant_users(
    admin_service: web::Data<AdminService>,
    user: AuthenticatedUser,
    query: web::Query<FindNonParticipantUsersQuery>,
) -> ApiResult<HttpResponse> {
    if !query.is_structurally_valid() {
        return Err(ApiError::MissingArguments);
    }

    require_admin(&user)?;

    let users = admin_service.find_non_participant_users(&query.instance_id).await?;

    Ok(HttpResponse::Ok().json(users))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(roles: Vec<&str>) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            instance_id: "instance-1".to_string(),
            roles: roles.into_iter().map(String::from).collect(),
            selected_profile_id: Uuid::new_v4(),
            account_confirmed: true,
        }
    }

    #[test]
    fn test_require_admin_rejects_non_admin() {
        let result = require_admin(&user(vec!["PARTICIPANT"]));
        assert!(matches!(result, Err(ApiError::PermissionDenied)));
    }

    #[test]
    fn test_require_admin_accepts_admin() {
        let result = require_admin(&user(vec!["PARTICIPANT", "ADMIN"]));
        assert!(result.is_ok());
    }
}
