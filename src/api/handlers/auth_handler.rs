//! Authentication handlers: registration, login, logout, OAuth callback.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{RegisterUser, UserResponse};
use crate::errors::AppResult;
use crate::services::TokenResponse;
use crate::types::MessageResponse;

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// User password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// User first name
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Alice")]
    pub name: String,
    /// User family name
    #[validate(length(min = 1, message = "Surname is required"))]
    #[schema(example = "Smith")]
    pub surname: String,
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// User email address
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// User password
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// GitHub OAuth callback query parameters
#[derive(Debug, Deserialize, IntoParams)]
pub struct GithubCallbackQuery {
    /// Authorization code handed back by GitHub
    pub code: String,
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "User already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .auth_service
        .register(RegisterUser {
            email: payload.email,
            password: payload.password,
            name: payload.name,
            surname: payload.surname,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// Login and get a session token
#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let token = state
        .auth_service
        .login(payload.email, payload.password)
        .await?;

    Ok(Json(token))
}

/// End the session.
///
/// Bearer sessions are stateless; the client discards the token.
#[utoipa::path(
    get,
    path = "/api/users/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Logged out")
    )
)]
pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out"))
}

/// Complete a GitHub OAuth login
#[utoipa::path(
    get,
    path = "/api/users/githubcallback",
    tag = "Authentication",
    params(GithubCallbackQuery),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Code exchange rejected")
    )
)]
pub async fn github_callback(
    State(state): State<AppState>,
    Query(query): Query<GithubCallbackQuery>,
) -> AppResult<Json<TokenResponse>> {
    let token = state.auth_service.github_callback(&query.code).await?;
    Ok(Json(token))
}
