//! OAuth provider integration.
//!
//! The service only needs one thing from a provider: turn a callback
//! code into a verified profile. Everything else (scopes, redirects,
//! consent screens) lives on the provider side.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GithubConfig;
use crate::errors::{AppError, AppResult};

const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";

/// Profile returned by a provider after a successful code exchange
#[derive(Debug, Clone)]
pub struct OAuthProfile {
    pub email: String,
    pub login: String,
    pub name: Option<String>,
}

/// Narrow provider seam consumed by the auth service
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Exchange an authorization code for the user's profile
    async fn exchange_code(&self, code: &str) -> AppResult<OAuthProfile>;
}

#[derive(Debug, Deserialize)]
struct GithubTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    login: String,
    name: Option<String>,
    email: Option<String>,
}

/// GitHub OAuth implementation
pub struct GithubProvider {
    http: reqwest::Client,
    config: GithubConfig,
}

impl GithubProvider {
    pub fn new(config: GithubConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl OAuthProvider for GithubProvider {
    async fn exchange_code(&self, code: &str) -> AppResult<OAuthProfile> {
        let token: GithubTokenResponse = self
            .http
            .post(GITHUB_TOKEN_URL)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| AppError::internal(format!("GitHub token exchange failed: {}", e)))?
            .json()
            .await
            .map_err(|_| AppError::BadRequest("GitHub rejected the authorization code".into()))?;

        let user: GithubUser = self
            .http
            .get(GITHUB_USER_URL)
            .header("Accept", "application/json")
            .header("User-Agent", "storefront-accounts")
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AppError::internal(format!("GitHub profile fetch failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::internal(format!("GitHub profile decode failed: {}", e)))?;

        let email = user
            .email
            .ok_or_else(|| AppError::BadRequest("GitHub account has no public email".into()))?;

        Ok(OAuthProfile {
            email,
            login: user.login,
            name: user.name,
        })
    }
}
