//! Registration, login and OAuth callback integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use storefront_accounts::config::Config;
use storefront_accounts::domain::{RegisterUser, User, UserChanges, UserRole};
use storefront_accounts::errors::{AppError, AppResult};
use storefront_accounts::infra::{OAuthProfile, OAuthProvider, UserRepository};
use storefront_accounts::services::{AuthService, Authenticator};

fn test_config() -> Config {
    std::env::set_var("JWT_SECRET", "integration-secret-key-32-chars-long");
    Config::from_env()
}

struct InMemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUsers {
    fn empty() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(
        &self,
        email: String,
        password_hash: String,
        name: String,
        surname: String,
    ) -> AppResult<User> {
        let user = User::new(Uuid::new_v4(), email, password_hash, name, surname);
        self.users.lock().unwrap().insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&id).ok_or(AppError::NotFound)?;
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        Ok(user.clone())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }
}

/// OAuth provider that returns a fixed profile for any code
struct StubOAuth {
    profile: OAuthProfile,
}

#[async_trait]
impl OAuthProvider for StubOAuth {
    async fn exchange_code(&self, _code: &str) -> AppResult<OAuthProfile> {
        Ok(self.profile.clone())
    }
}

/// OAuth provider whose exchange always fails
struct RejectingOAuth;

#[async_trait]
impl OAuthProvider for RejectingOAuth {
    async fn exchange_code(&self, _code: &str) -> AppResult<OAuthProfile> {
        Err(AppError::BadRequest(
            "GitHub rejected the authorization code".into(),
        ))
    }
}

fn authenticator(repo: Arc<InMemoryUsers>, oauth: Arc<dyn OAuthProvider>) -> Authenticator {
    Authenticator::new(repo, oauth, test_config())
}

fn registration() -> RegisterUser {
    RegisterUser {
        email: "alice@example.com".to_string(),
        password: "StrongPass123!".to_string(),
        name: "Alice".to_string(),
        surname: "Smith".to_string(),
    }
}

#[tokio::test]
async fn register_stores_hashed_password() {
    let repo = Arc::new(InMemoryUsers::empty());
    let auth = authenticator(repo.clone(), Arc::new(RejectingOAuth));

    let user = auth.register(registration()).await.unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.role, UserRole::User);
    assert_ne!(user.password_hash, "StrongPass123!");
    assert!(user.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let repo = Arc::new(InMemoryUsers::empty());
    let auth = authenticator(repo.clone(), Arc::new(RejectingOAuth));

    auth.register(registration()).await.unwrap();
    let result = auth.register(registration()).await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
    assert_eq!(repo.count(), 1);
}

#[tokio::test]
async fn login_returns_verifiable_token() {
    let repo = Arc::new(InMemoryUsers::empty());
    let auth = authenticator(repo, Arc::new(RejectingOAuth));

    let user = auth.register(registration()).await.unwrap();

    let response = auth
        .login("alice@example.com".to_string(), "StrongPass123!".to_string())
        .await
        .unwrap();

    assert_eq!(response.token_type, "Bearer");
    assert!(response.expires_in > 0);

    let claims = auth.verify_token(&response.access_token).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(claims.role, "user");
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let repo = Arc::new(InMemoryUsers::empty());
    let auth = authenticator(repo, Arc::new(RejectingOAuth));

    auth.register(registration()).await.unwrap();

    let result = auth
        .login("alice@example.com".to_string(), "WrongPass123!".to_string())
        .await;
    assert!(matches!(result.unwrap_err(), AppError::InvalidCredentials));
}

#[tokio::test]
async fn login_for_unknown_account_is_rejected_the_same_way() {
    let repo = Arc::new(InMemoryUsers::empty());
    let auth = authenticator(repo, Arc::new(RejectingOAuth));

    let result = auth
        .login("nobody@example.com".to_string(), "whatever123".to_string())
        .await;
    assert!(matches!(result.unwrap_err(), AppError::InvalidCredentials));
}

#[tokio::test]
async fn verify_token_rejects_garbage() {
    let repo = Arc::new(InMemoryUsers::empty());
    let auth = authenticator(repo, Arc::new(RejectingOAuth));

    assert!(auth.verify_token("not-a-token").is_err());
}

#[tokio::test]
async fn oauth_callback_provisions_new_account() {
    let repo = Arc::new(InMemoryUsers::empty());
    let oauth = Arc::new(StubOAuth {
        profile: OAuthProfile {
            email: "octocat@example.com".to_string(),
            login: "octocat".to_string(),
            name: Some("The Octocat".to_string()),
        },
    });
    let auth = authenticator(repo.clone(), oauth);

    let response = auth.github_callback("valid-code").await.unwrap();

    assert_eq!(repo.count(), 1);
    let claims = auth.verify_token(&response.access_token).unwrap();
    assert_eq!(claims.email, "octocat@example.com");

    let user = repo
        .find_by_email("octocat@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.name, "The Octocat");
    // Provisioned accounts get an unguessable placeholder credential
    assert!(user.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn oauth_callback_reuses_existing_account() {
    let repo = Arc::new(InMemoryUsers::empty());
    let oauth = Arc::new(StubOAuth {
        profile: OAuthProfile {
            email: "alice@example.com".to_string(),
            login: "alice".to_string(),
            name: None,
        },
    });
    let auth = authenticator(repo.clone(), oauth);

    let registered = auth.register(registration()).await.unwrap();
    let response = auth.github_callback("valid-code").await.unwrap();

    assert_eq!(repo.count(), 1);
    let claims = auth.verify_token(&response.access_token).unwrap();
    assert_eq!(claims.sub, registered.id);
}

#[tokio::test]
async fn oauth_callback_propagates_provider_failure() {
    let repo = Arc::new(InMemoryUsers::empty());
    let auth = authenticator(repo.clone(), Arc::new(RejectingOAuth));

    let result = auth.github_callback("bad-code").await;
    assert!(matches!(result.unwrap_err(), AppError::BadRequest(_)));
    assert_eq!(repo.count(), 0);
}
