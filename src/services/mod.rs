//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.

mod auth_service;
pub mod container;
mod password_reset;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use password_reset::{
    PasswordResetFlow, PasswordResetService, ResetClaims, ResetPrompt, ResetTokenCodec,
};
pub use user_service::{UserManager, UserService};
