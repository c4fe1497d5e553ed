//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, password_reset_handler, user_handler};
use crate::domain::{UserResponse, UserRole};
use crate::services::{ResetPrompt, TokenResponse};

/// OpenAPI documentation for the Storefront Accounts API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront Accounts",
        version = "0.1.0",
        description = "Account and password-reset service for the storefront API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::github_callback,
        // Password reset endpoints
        password_reset_handler::request_password,
        password_reset_handler::render_reset,
        password_reset_handler::reset_password,
        // User endpoints
        user_handler::current_user,
        user_handler::list_users,
        user_handler::change_role,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            // Password reset types
            password_reset_handler::RequestPasswordReset,
            password_reset_handler::ResetPasswordRequest,
            ResetPrompt,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and OAuth"),
        (name = "Password Reset", description = "Signed reset token lifecycle"),
        (name = "Users", description = "Profile, listing and role management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/users/login"))
                        .build(),
                ),
            );
        }
    }
}
