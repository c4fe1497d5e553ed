//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - Outgoing email transport
//! - OAuth provider exchange

pub mod db;
pub mod mailer;
pub mod oauth;
pub mod repositories;

pub use db::{Database, Migrator};
pub use mailer::{mailer_from_config, EmailMessage, LogMailer, Mailer, SmtpMailer};
pub use oauth::{GithubProvider, OAuthProfile, OAuthProvider};
pub use repositories::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockUserRepository;
