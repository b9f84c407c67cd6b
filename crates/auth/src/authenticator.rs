//! Email + password authentication against the user store.

use once_cell::sync::OnceCell;

use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::roles::satisfies;
use crate::store::UserStore;
use crate::user::User;

/// Verified against when the email is unknown so both failure paths cost a
/// full hash verification.
const DUMMY_PASSWORD: &str = "newsroom-dummy-password";

#[derive(Debug)]
pub struct Authenticator<S> {
    store: S,
    hasher: PasswordHasher,
    dummy_hash: OnceCell<Option<String>>,
}

impl<S> Authenticator<S>
where
    S: UserStore,
{
    pub fn new(store: S, hasher: PasswordHasher) -> Self {
        Self {
            store,
            hasher,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Check credentials and, optionally, a minimum role.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    /// The returned record still carries the password hash; strip it with
    /// [`User::summary`] before it leaves the trust boundary.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
        required_role: Option<&str>,
    ) -> Result<User, AuthError> {
        let user = self.store.find_by_email(email).await.map_err(|e| {
            tracing::error!(error = %e, "user lookup failed during login");
            AuthError::Store(e)
        })?;

        let Some(user) = user else {
            self.burn_dummy_verification(password);
            return Err(AuthError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        if let Some(required) = required_role {
            if !satisfies(user.role.as_str(), required) {
                tracing::info!(user_id = %user.id, role = %user.role, required, "role requirement not met");
                return Err(AuthError::InsufficientRole);
            }
        }

        tracing::debug!(user_id = %user.id, "credentials verified");
        Ok(user)
    }

    fn burn_dummy_verification(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_init(|| self.hasher.hash(DUMMY_PASSWORD).ok());
        if let Some(hash) = dummy {
            let _ = self.hasher.verify(password, hash);
        }
    }
}
