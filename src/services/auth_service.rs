//! Authentication service - registration, login and session tokens.
//!
//! The session context is an explicit, immutable JWT claims value
//! carried with each request instead of server-side session state.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, RegisterUser, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{OAuthProvider, UserRepository};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, registration: RegisterUser) -> AppResult<User>;

    /// Login and return a session token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Complete a GitHub OAuth callback: exchange the code, find or
    /// provision the account, and open a session.
    async fn github_callback(&self, code: &str) -> AppResult<TokenResponse>;

    /// Verify a session token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate a session token for a user
fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Concrete implementation of AuthService.
pub struct Authenticator {
    repo: Arc<dyn UserRepository>,
    oauth: Arc<dyn OAuthProvider>,
    config: Config,
}

impl Authenticator {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        oauth: Arc<dyn OAuthProvider>,
        config: Config,
    ) -> Self {
        Self {
            repo,
            oauth,
            config,
        }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, registration: RegisterUser) -> AppResult<User> {
        // Field format is validated by the handler's ValidatedJson extractor
        if self
            .repo
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        self.repo
            .create(
                registration.email,
                password_hash,
                registration.name,
                registration.surname,
            )
            .await
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user_result = self.repo.find_by_email(&email).await?;

        // Verify against a dummy hash when the account is absent so the
        // response time does not reveal whether the email exists.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";

        let (password_hash, user_exists) = match &user_result {
            Some(user) => (user.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let stored_password = Password::from_hash(password_hash.to_string());
        let password_valid = stored_password.verify(&password);

        if !user_exists || !password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Safe to unwrap since we verified user_exists is true
        generate_token(user_result.as_ref().unwrap(), &self.config)
    }

    async fn github_callback(&self, code: &str) -> AppResult<TokenResponse> {
        let profile = self.oauth.exchange_code(code).await?;

        let user = match self.repo.find_by_email(&profile.email).await? {
            Some(user) => user,
            None => {
                // First OAuth login provisions an account with an
                // unguessable placeholder credential.
                let placeholder = Password::new(&Uuid::new_v4().to_string())?.into_string();
                let name = profile.name.unwrap_or_else(|| profile.login.clone());
                self.repo
                    .create(profile.email, placeholder, name, String::new())
                    .await?
            }
        };

        tracing::info!(user_id = %user.id, "GitHub login");
        generate_token(&user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}
