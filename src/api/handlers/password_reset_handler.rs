//! Password reset handlers.
//!
//! Three steps: request a reset email, pre-check the token for the
//! password-entry view, and confirm the new password.

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{AppJson, ValidatedJson};
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::ResetPrompt;
use crate::types::MessageResponse;

/// Request body for starting a password reset
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestPasswordReset {
    /// Email address of the account to reset
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
}

/// Request body for confirming a password reset.
///
/// Deliberately not length-validated here: the mismatch check must run
/// before any other processing, and the minimum-length rule is applied
/// when the new credential is hashed.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// New password
    #[schema(example = "NewSecurePass123!")]
    pub password: String,
    /// Repeated password, must match
    #[schema(example = "NewSecurePass123!")]
    pub confirmed_password: String,
}

/// Request a password reset email
#[utoipa::path(
    post,
    path = "/api/users/request-password",
    tag = "Password Reset",
    request_body = RequestPasswordReset,
    responses(
        (status = 200, description = "Reset email dispatched"),
        (status = 404, description = "No account for that email"),
        (status = 500, description = "Email delivery failed")
    )
)]
pub async fn request_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RequestPasswordReset>,
) -> AppResult<Json<MessageResponse>> {
    state.reset_service.request_reset(&payload.email).await?;
    Ok(Json(MessageResponse::new("Check your email for a reset link")))
}

/// Pre-check a reset token before showing the password-entry form
#[utoipa::path(
    get,
    path = "/api/users/createPass/{token}",
    tag = "Password Reset",
    params(("token" = String, Path, description = "Reset token from the email")),
    responses(
        (status = 200, description = "Token is valid", body = ResetPrompt),
        (status = 400, description = "Invalid or expired token")
    )
)]
pub async fn render_reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<ResetPrompt>> {
    let prompt = state.reset_service.preview_reset(&token)?;
    Ok(Json(prompt))
}

/// Confirm a password reset with a new password
#[utoipa::path(
    post,
    path = "/api/users/createPass/{token}",
    tag = "Password Reset",
    params(("token" = String, Path, description = "Reset token from the email")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password updated"),
        (status = 400, description = "Mismatch, reuse, or invalid token"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .reset_service
        .confirm_reset(&token, &payload.password, &payload.confirmed_password)
        .await?;

    Ok(Json(MessageResponse::new("Password updated")))
}
