//! User record as seen by the authentication core.
//!
//! The record is owned by the persistence layer; the auth core reads it but
//! never mutates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use newsroom_core::{DomainError, UserId};

use crate::password::PasswordHasher;
use crate::roles::Role;
use crate::validation::{is_valid_email, is_valid_password};

// ─────────────────────────────────────────────────────────────────────────────
// User record
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted identity + credential entity.
///
/// # Invariants
/// - `email` is unique (case-insensitive) and stored lowercased.
/// - `password_hash` always holds a one-way hash, never plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a fresh record from registration input, hashing the password.
    pub fn register(new_user: NewUser, hasher: &PasswordHasher) -> Result<Self, DomainError> {
        let name = new_user.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }

        let email = normalize_email(&new_user.email);
        if !is_valid_email(&email) {
            return Err(DomainError::validation("invalid email format"));
        }
        if !is_valid_password(&new_user.password) {
            return Err(DomainError::validation("invalid password length"));
        }

        let password_hash = hasher
            .hash(&new_user.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            name,
            email,
            password_hash,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        })
    }

    /// The only view of a user that may leave the trust boundary.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Canonical form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ─────────────────────────────────────────────────────────────────────────────
// Views and inputs
// ─────────────────────────────────────────────────────────────────────────────

/// Name/email/role projection of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Registration / admin-provisioning input.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}
