//! User service - profile lookup, listing and the premium role toggle.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{User, UserChanges};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UserRepository;

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Flip a user between the premium and user roles
    async fn toggle_premium(&self, id: Uuid) -> AppResult<User>;
}

/// Concrete implementation of UserService.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.repo.find_by_id(id).await?.ok_or_not_found()
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repo.list().await
    }

    async fn toggle_premium(&self, id: Uuid) -> AppResult<User> {
        let user = self.repo.find_by_id(id).await?.ok_or_not_found()?;

        let next = user.role.toggled_premium();
        tracing::info!(user_id = %id, from = %user.role, to = %next, "Toggling role");

        self.repo.update(id, UserChanges::role(next)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::MockUserRepository;
    use mockall::predicate::eq;

    fn sample_user(id: Uuid, role: UserRole) -> User {
        let mut user = User::new(
            id,
            "alice@example.com".to_string(),
            "hashed".to_string(),
            "Alice".to_string(),
            "Smith".to_string(),
        );
        user.role = role;
        user
    }

    #[tokio::test]
    async fn toggle_promotes_plain_user_to_premium() {
        let id = Uuid::new_v4();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(id))
            .returning(move |id| Ok(Some(sample_user(id, UserRole::User))));
        repo.expect_update()
            .withf(|_, changes| changes.role == Some(UserRole::Premium))
            .returning(move |id, _| Ok(sample_user(id, UserRole::Premium)));

        let service = UserManager::new(Arc::new(repo));
        let updated = service.toggle_premium(id).await.unwrap();
        assert_eq!(updated.role, UserRole::Premium);
    }

    #[tokio::test]
    async fn toggle_demotes_premium_user() {
        let id = Uuid::new_v4();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(move |id| Ok(Some(sample_user(id, UserRole::Premium))));
        repo.expect_update()
            .withf(|_, changes| changes.role == Some(UserRole::User))
            .returning(move |id, _| Ok(sample_user(id, UserRole::User)));

        let service = UserManager::new(Arc::new(repo));
        let updated = service.toggle_premium(id).await.unwrap();
        assert_eq!(updated.role, UserRole::User);
    }

    #[tokio::test]
    async fn toggle_unknown_user_is_not_found() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        repo.expect_update().times(0);

        let service = UserManager::new(Arc::new(repo));
        let result = service.toggle_premium(Uuid::new_v4()).await;
        assert!(matches!(
            result.unwrap_err(),
            crate::errors::AppError::NotFound
        ));
    }
}
