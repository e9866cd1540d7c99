//! User domain types.

use serde::{Deserialize, Serialize};

use bookshelf_core::{Email, Role, UserId};

use crate::context::Actor;

/// A bookstore user.
///
/// `password` holds the plaintext only between construction and hashing
/// inside registration; every persisted `User` carries a one-way hash.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID, generated once at registration.
    pub id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address (unique lookup key).
    pub email: Email,
    /// Password hash (PHC string once persisted).
    pub password: String,
    /// Administrator or customer.
    pub role: Role,
}

impl User {
    /// Whether the user is an administrator.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// "First Last", used as the greeting in notifications.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The identity this user acts as once authenticated.
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role)
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Result of a successful registration or login.
///
/// Never persisted; the boundary hands the token to the client and drops it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Signed bearer token.
    pub token: String,
}

impl Credentials {
    /// Wrap an issued token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}
