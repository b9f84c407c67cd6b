//! Persistence collaborator contract plus an in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;

use newsroom_core::{DomainError, UserId};

use crate::roles::Role;
use crate::user::{User, UserSummary, normalize_email};

/// Read-side lookups the auth core needs from storage.
///
/// Implementations must enforce email uniqueness and compare emails
/// case-insensitively.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Fetches only name/email/role.
    async fn find_summary_by_id(&self, id: &UserId) -> Result<Option<UserSummary>, DomainError>;
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        (**self).find_by_email(email).await
    }

    async fn find_summary_by_id(&self, id: &UserId) -> Result<Option<UserSummary>, DomainError> {
        (**self).find_summary_by_id(id).await
    }
}

/// In-memory user store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, mut user: User) -> Result<(), DomainError> {
        user.email = normalize_email(&user.email);
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::unavailable("user store lock poisoned"))?;
        if map.values().any(|u| u.email == user.email && u.id != user.id) {
            return Err(DomainError::conflict(format!("email already registered: {}", user.email)));
        }
        map.insert(user.id, user);
        Ok(())
    }

    pub fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::unavailable("user store lock poisoned"))?;
        Ok(map.remove(id).is_some())
    }

    pub fn set_role(&self, id: &UserId, role: Role) -> Result<(), DomainError> {
        self.update(id, |user| user.role = role)
    }

    pub fn set_password_hash(&self, id: &UserId, password_hash: String) -> Result<(), DomainError> {
        self.update(id, |user| user.password_hash = password_hash)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn update(&self, id: &UserId, f: impl FnOnce(&mut User)) -> Result<(), DomainError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| DomainError::unavailable("user store lock poisoned"))?;
        let user = map.get_mut(id).ok_or(DomainError::NotFound)?;
        f(user);
        user.updated_at = Utc::now();
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = normalize_email(email);
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::unavailable("user store lock poisoned"))?;
        Ok(map.values().find(|u| u.email == email).cloned())
    }

    async fn find_summary_by_id(&self, id: &UserId) -> Result<Option<UserSummary>, DomainError> {
        let map = self
            .inner
            .read()
            .map_err(|_| DomainError::unavailable("user store lock poisoned"))?;
        Ok(map.get(id).map(User::summary))
    }
}
