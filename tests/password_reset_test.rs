//! Password reset flow integration tests.
//!
//! Exercise the full request -> email -> confirm lifecycle against
//! in-memory collaborators, without a database or SMTP server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use storefront_accounts::domain::{Password, User, UserChanges};
use storefront_accounts::errors::{AppError, AppResult, ResetTokenError};
use storefront_accounts::infra::{EmailMessage, Mailer, UserRepository};
use storefront_accounts::services::{PasswordResetFlow, PasswordResetService, ResetTokenCodec};

const SECRET: &[u8] = b"test-secret-key-for-testing-only-32chars";
const BASE_URL: &str = "http://localhost:8080";

// =============================================================================
// In-memory collaborators
// =============================================================================

/// In-memory user store that records lookup and update traffic
struct InMemoryUsers {
    users: Mutex<HashMap<Uuid, User>>,
    email_lookups: AtomicUsize,
    updates: AtomicUsize,
}

impl InMemoryUsers {
    fn with_user(user: User) -> Self {
        let mut users = HashMap::new();
        users.insert(user.id, user);
        Self {
            users: Mutex::new(users),
            email_lookups: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    fn empty() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            email_lookups: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    fn stored_hash(&self, id: Uuid) -> String {
        self.users.lock().unwrap()[&id].password_hash.clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.email_lookups.fetch_add(1, Ordering::SeqCst);
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
        self.updates.fetch_add(1, Ordering::SeqCst);
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

/// Mailer that records outgoing messages instead of sending them
struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    fn last_message(&self) -> EmailMessage {
        self.sent.lock().unwrap().last().cloned().unwrap()
    }

    /// Pull the raw token out of the email body
    fn last_token(&self) -> String {
        let html = self.last_message().html;
        html.split("Reset token: ")
            .nth(1)
            .and_then(|rest| rest.split("</p>").next())
            .unwrap()
            .to_string()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> AppResult<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Mailer whose transport always fails
struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: EmailMessage) -> AppResult<()> {
        Err(AppError::delivery("connection refused"))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn alice() -> User {
    User::new(
        Uuid::new_v4(),
        "alice@example.com".to_string(),
        Password::new("OriginalPass123!").unwrap().into_string(),
        "Alice".to_string(),
        "Smith".to_string(),
    )
}

fn flow_with_ttl(
    repo: Arc<InMemoryUsers>,
    mailer: Arc<dyn Mailer>,
    ttl: Duration,
) -> PasswordResetFlow {
    PasswordResetFlow::new(
        repo,
        mailer,
        ResetTokenCodec::new(SECRET, ttl),
        BASE_URL,
        "noreply@example.com",
    )
}

fn flow(repo: Arc<InMemoryUsers>, mailer: Arc<dyn Mailer>) -> PasswordResetFlow {
    flow_with_ttl(repo, mailer, Duration::hours(1))
}

// =============================================================================
// Request phase
// =============================================================================

#[tokio::test]
async fn request_dispatches_email_with_reset_link() {
    let user = alice();
    let repo = Arc::new(InMemoryUsers::with_user(user));
    let mailer = Arc::new(RecordingMailer::new());

    flow(repo, mailer.clone())
        .request_reset("alice@example.com")
        .await
        .unwrap();

    assert_eq!(mailer.sent_count(), 1);
    let message = mailer.last_message();
    assert_eq!(message.to, "alice@example.com");
    assert_eq!(message.subject, "Reset Password");

    let token = mailer.last_token();
    assert!(!token.is_empty());
    assert!(message
        .html
        .contains(&format!("{}/api/users/createPass/{}", BASE_URL, token)));
}

#[tokio::test]
async fn request_for_unknown_email_sends_nothing() {
    let repo = Arc::new(InMemoryUsers::empty());
    let mailer = Arc::new(RecordingMailer::new());

    let result = flow(repo, mailer.clone())
        .request_reset("nobody@example.com")
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn transport_failure_surfaces_as_delivery_error() {
    let repo = Arc::new(InMemoryUsers::with_user(alice()));

    let result = flow(repo, Arc::new(FailingMailer))
        .request_reset("alice@example.com")
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Delivery(_)));
}

// =============================================================================
// Confirmation phase
// =============================================================================

#[tokio::test]
async fn full_reset_lifecycle() {
    let user = alice();
    let user_id = user.id;
    let repo = Arc::new(InMemoryUsers::with_user(user));
    let mailer = Arc::new(RecordingMailer::new());
    let flow = flow(repo.clone(), mailer.clone());

    let original_hash = repo.stored_hash(user_id);

    // Request the reset and pull the token from the email
    flow.request_reset("alice@example.com").await.unwrap();
    let token = mailer.last_token();

    // The pre-check exposes the bound email
    let prompt = flow.preview_reset(&token).unwrap();
    assert_eq!(prompt.email, "alice@example.com");

    // Confirm with a new password
    flow.confirm_reset(&token, "BrandNewPass456!", "BrandNewPass456!")
        .await
        .unwrap();

    let new_hash = repo.stored_hash(user_id);
    assert_ne!(new_hash, original_hash);
    assert!(Password::from_hash(new_hash).verify("BrandNewPass456!"));

    // Replaying the token with the same password is rejected as reuse
    let replay = flow
        .confirm_reset(&token, "BrandNewPass456!", "BrandNewPass456!")
        .await;
    assert!(matches!(replay.unwrap_err(), AppError::PasswordReuse));
    assert_eq!(repo.updates.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn mismatch_short_circuits_before_any_lookup() {
    let repo = Arc::new(InMemoryUsers::with_user(alice()));
    let mailer = Arc::new(RecordingMailer::new());
    let flow = flow(repo.clone(), mailer);

    let result = flow.confirm_reset("irrelevant-token", "x", "y").await;

    assert!(matches!(result.unwrap_err(), AppError::PasswordMismatch));
    assert_eq!(repo.email_lookups.load(Ordering::SeqCst), 0);
    assert_eq!(repo.updates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn reusing_current_password_issues_no_update() {
    let repo = Arc::new(InMemoryUsers::with_user(alice()));
    let mailer = Arc::new(RecordingMailer::new());
    let flow = flow(repo.clone(), mailer.clone());

    flow.request_reset("alice@example.com").await.unwrap();
    let token = mailer.last_token();

    let result = flow
        .confirm_reset(&token, "OriginalPass123!", "OriginalPass123!")
        .await;

    assert!(matches!(result.unwrap_err(), AppError::PasswordReuse));
    assert_eq!(repo.updates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn expired_token_is_rejected_end_to_end() {
    let repo = Arc::new(InMemoryUsers::with_user(alice()));
    let mailer = Arc::new(RecordingMailer::new());
    let flow = flow_with_ttl(repo.clone(), mailer.clone(), Duration::minutes(-5));

    flow.request_reset("alice@example.com").await.unwrap();
    let token = mailer.last_token();

    let result = flow
        .confirm_reset(&token, "BrandNewPass456!", "BrandNewPass456!")
        .await;

    assert!(matches!(
        result.unwrap_err(),
        AppError::InvalidResetToken(ResetTokenError::Expired)
    ));
    assert_eq!(repo.updates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn token_for_deleted_account_is_not_found() {
    let user = alice();
    let repo = Arc::new(InMemoryUsers::with_user(user.clone()));
    let mailer = Arc::new(RecordingMailer::new());
    let flow = flow(repo.clone(), mailer.clone());

    flow.request_reset("alice@example.com").await.unwrap();
    let token = mailer.last_token();

    // Account disappears between request and confirmation
    repo.users.lock().unwrap().remove(&user.id);

    let result = flow
        .confirm_reset(&token, "BrandNewPass456!", "BrandNewPass456!")
        .await;
    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}
