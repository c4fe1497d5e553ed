//! User handlers: profile, listing and the premium role toggle.

use axum::{
    extract::{Path, State},
    response::Json,
    Extension,
};
use uuid::Uuid;

use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::UserResponse;
use crate::errors::AppResult;

/// Get the authenticated user's profile
#[utoipa::path(
    get,
    path = "/api/users/current",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn current_user(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(current.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/api/users/allUsers",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<Vec<UserResponse>>> {
    require_admin(&current)?;

    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Toggle a user between the premium and user roles (admin only)
#[utoipa::path(
    post,
    path = "/api/users/premium/{uid}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("uid" = Uuid, Path, description = "User to toggle")),
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn change_role(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(uid): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&current)?;

    let user = state.user_service.toggle_premium(uid).await?;
    Ok(Json(UserResponse::from(user)))
}
