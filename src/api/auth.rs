//! Authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{ForgotPassword, LoginUser, RegisterUser, ResetPassword, User},
};

use super::AuthenticatedUser;

/// Token response after registration or login
#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    /// Signed JWT
    pub token: String,
    pub token_type: String,
    pub user: User,
}

/// Simple status message
#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterUser,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterUser>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (token, user) = state.services.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            user,
        }),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginUser,
    responses(
        (status = 200, description = "Authenticated", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginUser>,
) -> AppResult<Json<TokenResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (token, user) = state.services.auth.login(request).await?;

    Ok(Json(TokenResponse {
        token,
        token_type: "Bearer".to_string(),
        user,
    }))
}

/// Log out the authenticated user
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session revoked", body = StatusResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<StatusResponse>> {
    state.services.auth.logout(claims.user_id).await?;

    Ok(Json(StatusResponse {
        status: "logged out".to_string(),
    }))
}

/// Get the authenticated account
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = User),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<User>> {
    let user = state.services.auth.me(claims.user_id).await?;
    Ok(Json(user))
}

/// Request a password reset token by email
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPassword,
    responses(
        (status = 200, description = "Reset token sent if the account exists", body = StatusResponse)
    )
)]
pub async fn forgot_password(
    State(state): State<crate::AppState>,
    Json(request): Json<ForgotPassword>,
) -> AppResult<Json<StatusResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state.services.auth.forgot_password(&request.email).await?;

    Ok(Json(StatusResponse {
        status: "If the account exists, a reset token has been sent".to_string(),
    }))
}

/// Reset the password with a previously issued token
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    tag = "auth",
    request_body = ResetPassword,
    responses(
        (status = 200, description = "Password replaced", body = StatusResponse),
        (status = 401, description = "Invalid or expired token")
    )
)]
pub async fn reset_password(
    State(state): State<crate::AppState>,
    Json(request): Json<ResetPassword>,
) -> AppResult<Json<StatusResponse>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .auth
        .reset_password(&request.token, &request.new_password)
        .await?;

    Ok(Json(StatusResponse {
        status: "password reset".to_string(),
    }))
}
