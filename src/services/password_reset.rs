//! Password reset flow: token issuance, email dispatch, confirmation.
//!
//! The reset credential is a signed, self-contained JWT binding a user
//! identity to an absolute expiry. Validity derives entirely from the
//! signature and the embedded `exp`; nothing is stored server-side, so
//! a token cannot be revoked and may be replayed until it expires.
//! The ttl is kept short for that reason.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, RESET_EMAIL_SUBJECT, RESET_LINK_PATH};
use crate::domain::{Password, UserChanges};
use crate::errors::{AppError, AppResult, OptionExt, ResetTokenError};
use crate::infra::{EmailMessage, Mailer, UserRepository};

/// Claims embedded in a reset token
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    /// User id the token was issued for
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Response for the reset pre-check (the password-entry view)
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetPrompt {
    /// Email address the verified token was issued for
    #[schema(example = "alice@example.com")]
    pub email: String,
}

/// Encodes and decodes signed, time-limited reset tokens.
///
/// Pure: issuing depends only on the claims, the ttl, the clock and the
/// secret; verification has no side effects.
pub struct ResetTokenCodec {
    secret: Vec<u8>,
    ttl: Duration,
}

impl ResetTokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Issue a token for `{user_id, email}` expiring at now + ttl.
    pub fn issue(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = ResetClaims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )?;

        Ok(token)
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// Fails with `InvalidResetToken` carrying one of three reasons:
    /// `signature`, `expired` or `malformed`.
    pub fn verify(&self, token: &str) -> AppResult<ResetClaims> {
        // No leeway: a token is valid only while now <= exp
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<ResetClaims>(token, &DecodingKey::from_secret(&self.secret), &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => ResetTokenError::Expired,
                    ErrorKind::InvalidSignature => ResetTokenError::Signature,
                    _ => ResetTokenError::Malformed,
                };
                AppError::InvalidResetToken(reason)
            })
    }
}

/// Password reset service trait for dependency injection.
#[async_trait]
pub trait PasswordResetService: Send + Sync {
    /// Issue a reset token for the account behind `email` and mail the
    /// reset link. Fails with `NotFound` for unknown addresses.
    async fn request_reset(&self, email: &str) -> AppResult<()>;

    /// Pre-check a token before showing the password-entry form.
    fn preview_reset(&self, token: &str) -> AppResult<ResetPrompt>;

    /// Verify the token and commit the new password.
    async fn confirm_reset(
        &self,
        token: &str,
        password: &str,
        confirmed_password: &str,
    ) -> AppResult<()>;
}

/// Concrete reset flow over the user repository and the mailer.
pub struct PasswordResetFlow {
    repo: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    codec: ResetTokenCodec,
    base_url: String,
    from: String,
}

impl PasswordResetFlow {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        codec: ResetTokenCodec,
        base_url: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            repo,
            mailer,
            codec,
            base_url: base_url.into(),
            from: from.into(),
        }
    }

    /// Wire the flow from application config.
    pub fn from_config(
        repo: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        config: &Config,
    ) -> Self {
        let codec = ResetTokenCodec::new(
            config.jwt_secret_bytes(),
            Duration::minutes(config.reset_token_ttl_minutes),
        );
        Self::new(repo, mailer, codec, &config.base_url, &config.smtp.from)
    }

    fn reset_url(&self, token: &str) -> String {
        format!("{}{}/{}", self.base_url, RESET_LINK_PATH, token)
    }

    fn reset_email(&self, to: &str, token: &str) -> EmailMessage {
        let url = self.reset_url(token);
        EmailMessage {
            from: self.from.clone(),
            to: to.to_string(),
            subject: RESET_EMAIL_SUBJECT.to_string(),
            html: format!(
                "<p>To change your password, click the following link: \
                 <a href=\"{url}\">{url}</a></p>\n<p>Reset token: {token}</p>"
            ),
        }
    }
}

#[async_trait]
impl PasswordResetService for PasswordResetFlow {
    async fn request_reset(&self, email: &str) -> AppResult<()> {
        let user = self.repo.find_by_email(email).await?.ok_or_not_found()?;

        let token = self.codec.issue(user.id, &user.email)?;

        // Single blocking attempt; a failing transport fails the request
        self.mailer.send(self.reset_email(&user.email, &token)).await?;

        tracing::info!(user_id = %user.id, "Password reset email dispatched");
        Ok(())
    }

    fn preview_reset(&self, token: &str) -> AppResult<ResetPrompt> {
        let claims = self.codec.verify(token)?;
        Ok(ResetPrompt {
            email: claims.email,
        })
    }

    async fn confirm_reset(
        &self,
        token: &str,
        password: &str,
        confirmed_password: &str,
    ) -> AppResult<()> {
        // Fail-fast, in order: mismatch, token, lookup, reuse, commit.
        if password != confirmed_password {
            return Err(AppError::PasswordMismatch);
        }

        let claims = self.codec.verify(token)?;

        let user = self
            .repo
            .find_by_email(&claims.email)
            .await?
            .ok_or_not_found()?;

        // New password must differ from the stored one
        if Password::from_hash(user.password_hash.clone()).verify(password) {
            return Err(AppError::PasswordReuse);
        }

        let hash = Password::new(password)?.into_string();
        self.repo
            .update(user.id, UserChanges::password_hash(hash))
            .await?;

        tracing::info!(user_id = %user.id, "Password reset committed");
        Ok(())
    }
}
