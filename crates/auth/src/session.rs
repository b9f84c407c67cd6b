//! Maps a presented session token to the current user.

use std::sync::Arc;

use newsroom_core::UserId;

use crate::cipher::EncryptedId;
use crate::store::UserStore;
use crate::token::TokenService;
use crate::user::UserSummary;

/// Why a session did not resolve to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingToken,
    InvalidToken,
    MalformedToken,
    UndecryptableSubject,
    UserNotFound,
    LookupFailed,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rejection::MissingToken => "missing token",
            Rejection::InvalidToken => "invalid token",
            Rejection::MalformedToken => "malformed token",
            Rejection::UndecryptableSubject => "undecryptable subject",
            Rejection::UserNotFound => "user not found",
            Rejection::LookupFailed => "user lookup failed",
        }
    }
}

impl core::fmt::Display for Rejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    Authenticated(UserSummary),
    Unauthenticated(Rejection),
}

impl AuthResult {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthResult::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserSummary> {
        match self {
            AuthResult::Authenticated(user) => Some(user),
            AuthResult::Unauthenticated(_) => None,
        }
    }

    pub fn into_user(self) -> Option<UserSummary> {
        match self {
            AuthResult::Authenticated(user) => Some(user),
            AuthResult::Unauthenticated(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct SessionResolver<S> {
    tokens: Arc<TokenService>,
    store: S,
}

impl<S> SessionResolver<S>
where
    S: UserStore,
{
    pub fn new(tokens: Arc<TokenService>, store: S) -> Self {
        Self { tokens, store }
    }

    /// Never fails: every problem becomes an `Unauthenticated` outcome.
    pub async fn resolve(&self, token: Option<&str>) -> AuthResult {
        match self.try_resolve(token).await {
            Ok(user) => AuthResult::Authenticated(user),
            Err(rejection) => {
                if rejection == Rejection::MissingToken {
                    tracing::debug!(reason = rejection.as_str(), "session rejected");
                } else {
                    tracing::warn!(reason = rejection.as_str(), "session rejected");
                }
                AuthResult::Unauthenticated(rejection)
            }
        }
    }

    async fn try_resolve(&self, token: Option<&str>) -> Result<UserSummary, Rejection> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(Rejection::MissingToken)?;

        let claims = self
            .tokens
            .verify_token(token)
            .ok_or(Rejection::InvalidToken)?;

        let subject: EncryptedId = claims.sub.parse().map_err(|_| Rejection::MalformedToken)?;

        let user_id: UserId = self
            .tokens
            .cipher()
            .decrypt(&subject)
            .ok()
            .and_then(|plain| plain.parse().ok())
            .ok_or(Rejection::UndecryptableSubject)?;

        match self.store.find_summary_by_id(&user_id).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(Rejection::UserNotFound),
            Err(e) => {
                tracing::error!(error = %e, "user lookup failed during session resolution");
                Err(Rejection::LookupFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::SessionClaims;
    use crate::roles::Role;
    use crate::secrets::StaticSecrets;
    use crate::store::InMemoryUserStore;
    use crate::token::TokenOptions;
    use crate::user::User;
    use async_trait::async_trait;
    use chrono::{TimeDelta, Utc};
    use newsroom_core::DomainError;
    use std::time::Duration;

    const KEY: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(&StaticSecrets::new("resolver-secret", KEY)).unwrap())
    }

    fn user() -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            role: Role::Editor,
            created_at: now,
            updated_at: now,
        }
    }

    fn setup() -> (SessionResolver<Arc<InMemoryUserStore>>, Arc<InMemoryUserStore>, User) {
        let store = Arc::new(InMemoryUserStore::new());
        let alice = user();
        store.insert(alice.clone()).unwrap();
        (SessionResolver::new(tokens(), store.clone()), store, alice)
    }

    fn signed(sub: &str) -> String {
        let now = Utc::now();
        tokens()
            .encode_claims(&SessionClaims {
                sub: sub.to_string(),
                iat: now,
                exp: now + TimeDelta::hours(1),
                role: None,
            })
            .unwrap()
    }

    #[tokio::test]
    async fn valid_token_resolves_to_summary() {
        let (resolver, _, alice) = setup();
        let token = tokens().create_token(&alice.id).unwrap();

        let result = resolver.resolve(Some(&token)).await;
        assert_eq!(result, AuthResult::Authenticated(alice.summary()));
        assert_eq!(result.user().map(|u| u.role), Some(Role::Editor));
    }

    #[tokio::test]
    async fn missing_or_blank_token() {
        let (resolver, _, _) = setup();
        for token in [None, Some(""), Some("   ")] {
            assert_eq!(
                resolver.resolve(token).await,
                AuthResult::Unauthenticated(Rejection::MissingToken)
            );
        }
    }

    #[tokio::test]
    async fn unverifiable_token() {
        let (resolver, _, _) = setup();
        assert_eq!(
            resolver.resolve(Some("a.b.c")).await,
            AuthResult::Unauthenticated(Rejection::InvalidToken)
        );
    }

    #[tokio::test]
    async fn subject_without_separator_is_malformed() {
        let (resolver, _, _) = setup();
        assert_eq!(
            resolver.resolve(Some(&signed("no-separator"))).await,
            AuthResult::Unauthenticated(Rejection::MalformedToken)
        );
    }

    #[tokio::test]
    async fn well_formed_but_undecryptable_subject() {
        let (resolver, _, _) = setup();
        let sub = format!("{}:{}", "00".repeat(16), "ab".repeat(40));
        assert_eq!(
            resolver.resolve(Some(&signed(&sub))).await,
            AuthResult::Unauthenticated(Rejection::UndecryptableSubject)
        );
    }

    #[tokio::test]
    async fn decrypted_subject_must_be_a_user_id() {
        let (resolver, _, _) = setup();
        let sub = tokens().cipher().encrypt("not-a-uuid").unwrap().to_string();
        assert_eq!(
            resolver.resolve(Some(&signed(&sub))).await,
            AuthResult::Unauthenticated(Rejection::UndecryptableSubject)
        );
    }

    #[tokio::test]
    async fn deleted_user_is_not_found() {
        let (resolver, store, alice) = setup();
        let tokens = tokens();
        let token = tokens.create_token(&alice.id).unwrap();
        store.delete(&alice.id).unwrap();

        // The token itself stays valid; only the lookup revokes it.
        assert!(tokens.verify_token(&token).is_some());
        assert_eq!(
            resolver.resolve(Some(&token)).await,
            AuthResult::Unauthenticated(Rejection::UserNotFound)
        );
    }

    #[tokio::test]
    async fn suffixed_token_is_invalid() {
        let (resolver, _, alice) = setup();
        let token = tokens().create_token(&alice.id).unwrap();

        assert_eq!(
            resolver.resolve(Some(&format!("{token}tamperSuffix"))).await,
            AuthResult::Unauthenticated(Rejection::InvalidToken)
        );
    }

    #[tokio::test]
    async fn short_lived_token_expires() {
        let (resolver, _, alice) = setup();
        let token = tokens()
            .create_token_with(
                &alice.id,
                TokenOptions {
                    role: None,
                    ttl: "1ms".parse().unwrap(),
                },
            )
            .unwrap();

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(
            resolver.resolve(Some(&token)).await,
            AuthResult::Unauthenticated(Rejection::InvalidToken)
        );
    }

    #[tokio::test]
    async fn role_change_is_visible_immediately() {
        let (resolver, store, alice) = setup();
        let token = tokens().create_token(&alice.id).unwrap();
        store.set_role(&alice.id, Role::User).unwrap();

        let user = resolver.resolve(Some(&token)).await.into_user().unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[tokio::test]
    async fn store_failure_is_unauthenticated() {
        struct Down;

        #[async_trait]
        impl UserStore for Down {
            async fn find_by_email(&self, _: &str) -> Result<Option<User>, DomainError> {
                Err(DomainError::unavailable("down"))
            }
            async fn find_summary_by_id(&self, _: &UserId) -> Result<Option<UserSummary>, DomainError> {
                Err(DomainError::unavailable("down"))
            }
        }

        let resolver = SessionResolver::new(tokens(), Down);
        let token = tokens().create_token(&UserId::new()).unwrap();
        assert_eq!(
            resolver.resolve(Some(&token)).await,
            AuthResult::Unauthenticated(Rejection::LookupFailed)
        );
    }
}
