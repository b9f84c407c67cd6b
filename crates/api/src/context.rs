use newsroom_auth::{Rejection, Role, UserSummary};

/// Authenticated user for the current request, inserted by the session
/// middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(UserSummary);

impl CurrentUser {
    pub fn new(user: UserSummary) -> Self {
        Self(user)
    }

    pub fn user(&self) -> &UserSummary {
        &self.0
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn into_inner(self) -> UserSummary {
        self.0
    }
}

/// Why the session middleware did not authenticate the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRejection(pub Rejection);
