//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::infra::Database;
use crate::services::{AuthService, PasswordResetService, Services, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Password reset service
    pub reset_service: Arc<dyn PasswordResetService>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: crate::config::Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);

        use crate::services::ServiceContainer;
        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            reset_service: container.password_reset(),
            database,
        }
    }

    /// Create application state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        reset_service: Arc<dyn PasswordResetService>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            reset_service,
            database,
        }
    }
}
