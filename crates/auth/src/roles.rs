//! Role hierarchy used for "at least this privileged" checks.
//!
//! Levels are a total, injective mapping: `user` (alias `reader`) = 1,
//! `editor` = 2, `admin` = 3. Anything else is level 0 and never satisfies a
//! positive requirement.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a persisted user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[serde(alias = "reader")]
    User,
    Editor,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Editor, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }

    pub fn level(&self) -> u8 {
        match self {
            Role::User => 1,
            Role::Editor => 2,
            Role::Admin => 3,
        }
    }

    /// Higher roles inherit the access of lower ones.
    pub fn satisfies(&self, required: &Role) -> bool {
        self.level() >= required.level()
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" | "reader" => Ok(Role::User),
            "editor" => Ok(Role::Editor),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Level of a role name; unknown names are 0.
pub fn level(role: &str) -> u8 {
    role.parse::<Role>().map(|r| r.level()).unwrap_or(0)
}

/// `level(actual) >= level(required)`.
pub fn satisfies(actual: &str, required: &str) -> bool {
    level(actual) >= level(required)
}
