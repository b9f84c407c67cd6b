//! Request/response bodies of the auth routes.

use serde::Serialize;
use serde_json::Value;

use newsroom_auth::validation::{is_valid_email_value, is_valid_password_value};
use newsroom_auth::{Role, UserSummary};

/// Login input after shape checks. Built from raw JSON so that non-string
/// fields are rejected the same way as malformed strings.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsError {
    /// Body is not a JSON object.
    NotAnObject,
    /// Email or password missing, mistyped, or out of bounds.
    InvalidShape,
}

impl Credentials {
    pub fn from_json(body: &Value) -> Result<Self, CredentialsError> {
        let object = body.as_object().ok_or(CredentialsError::NotAnObject)?;

        let email = object.get("email").unwrap_or(&Value::Null);
        let password = object.get("password").unwrap_or(&Value::Null);
        if !is_valid_email_value(email) || !is_valid_password_value(password) {
            return Err(CredentialsError::InvalidShape);
        }

        Ok(Self {
            email: email.as_str().unwrap_or_default().to_string(),
            password: password.as_str().unwrap_or_default().to_string(),
            role: object.get("role").and_then(Value::as_str).map(str::to_string),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct AdminUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub message: &'static str,
    pub user: AdminUser,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_well_formed_credentials() {
        let creds = Credentials::from_json(&json!({
            "email": "a@b.com",
            "password": "pw",
            "role": "editor"
        }))
        .unwrap();
        assert_eq!(creds.email, "a@b.com");
        assert_eq!(creds.role.as_deref(), Some("editor"));
        assert!(!format!("{creds:?}").contains("pw\""));
    }

    #[test]
    fn rejects_non_objects() {
        for body in [json!(null), json!("a@b.com"), json!([1, 2]), json!(42)] {
            assert_eq!(
                Credentials::from_json(&body).unwrap_err(),
                CredentialsError::NotAnObject
            );
        }
    }

    #[test]
    fn rejects_bad_shapes() {
        for body in [
            json!({}),
            json!({"email": "a@b.com"}),
            json!({"email": 1, "password": "pw"}),
            json!({"email": "a@b.com", "password": ""}),
            json!({"email": "a@b.com", "password": {"$ne": ""}}),
            json!({"email": "nope", "password": "pw"}),
        ] {
            assert_eq!(
                Credentials::from_json(&body).unwrap_err(),
                CredentialsError::InvalidShape,
                "{body}"
            );
        }
    }

    #[test]
    fn me_response_omits_user_when_anonymous() {
        let body = serde_json::to_value(MeResponse {
            authenticated: false,
            user: None,
        })
        .unwrap();
        assert_eq!(body, json!({"authenticated": false}));
    }
}
