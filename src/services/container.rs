//! Service container - centralized service construction and access.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, PasswordResetFlow, PasswordResetService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::{mailer_from_config, GithubProvider, UserStore};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get password reset service
    fn password_reset(&self) -> Arc<dyn PasswordResetService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    reset_service: Arc<dyn PasswordResetService>,
}

impl Services {
    /// Create a new service container with all services initialized
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        reset_service: Arc<dyn PasswordResetService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            reset_service,
        }
    }

    /// Wire the full service graph from a database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let repo = Arc::new(UserStore::new(db));
        let mailer = mailer_from_config(&config.smtp);
        let oauth = Arc::new(GithubProvider::new(config.github.clone()));

        let reset_service = Arc::new(PasswordResetFlow::from_config(
            repo.clone(),
            mailer,
            &config,
        ));
        let auth_service = Arc::new(Authenticator::new(repo.clone(), oauth, config));
        let user_service = Arc::new(UserManager::new(repo));

        Self {
            auth_service,
            user_service,
            reset_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn password_reset(&self) -> Arc<dyn PasswordResetService> {
        self.reset_service.clone()
    }
}
