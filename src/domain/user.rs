//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_PREMIUM, ROLE_USER};

/// User roles enumeration.
///
/// A closed set: role strings from the database or a JWT are mapped
/// here once, and everything downstream matches on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Premium,
    Admin,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// The role the premium toggle flips to.
    ///
    /// Premium drops back to user, everything else becomes premium.
    pub fn toggled_premium(&self) -> UserRole {
        match self {
            UserRole::Premium => UserRole::User,
            _ => UserRole::Premium,
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            ROLE_PREMIUM => UserRole::Premium,
            _ => UserRole::User,
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::Premium => write!(f, "{}", ROLE_PREMIUM),
            UserRole::User => write!(f, "{}", ROLE_USER),
        }
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub surname: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with default role
    pub fn new(
        id: Uuid,
        email: String,
        password_hash: String,
        name: String,
        surname: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            password_hash,
            name,
            surname,
            role: UserRole::User,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if user has admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// User registration data transfer object
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterUser {
    /// User email address
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// User password (minimum 8 characters)
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// User first name
    #[schema(example = "Alice")]
    pub name: String,
    /// User family name
    #[schema(example = "Smith")]
    pub surname: String,
}

/// Partial update applied through the repository.
///
/// `None` fields are left untouched; this is the only mutation surface
/// the account flows use (role toggle, password reset).
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub role: Option<UserRole>,
    pub password_hash: Option<String>,
}

impl UserChanges {
    /// Change only the stored credential
    pub fn password_hash(hash: impl Into<String>) -> Self {
        Self {
            password_hash: Some(hash.into()),
            ..Self::default()
        }
    }

    /// Change only the role
    pub fn role(role: UserRole) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User email address
    #[schema(example = "alice@example.com")]
    pub email: String,
    /// User first name
    #[schema(example = "Alice")]
    pub name: String,
    /// User family name
    #[schema(example = "Smith")]
    pub surname: String,
    /// User role
    #[schema(example = "user")]
    pub role: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            surname: user.surname,
            role: user.role.to_string(),
            created_at: user.created_at,
        }
    }
}
