//! Login, back-office login, session lookup and logout.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use newsroom_auth::{Role, TokenOptions, User};

use crate::app::dto::{
    AdminLoginResponse, AdminUser, Credentials, CredentialsError, LoginResponse, LogoutResponse,
    MeResponse,
};
use crate::app::errors::{self, INVALID_REQUEST_MESSAGE};
use crate::app::services::AppServices;
use crate::context::CurrentUser;

pub const LOGIN_MESSAGE: &str = "Connexion réussie";
pub const ADMIN_LOGIN_MESSAGE: &str = "Accès Admin accordé";
pub const LOGOUT_MESSAGE: &str = "Déconnecté avec succès";

/// Routes that do not need a resolved session.
pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/admin-login", post(admin_login))
        .route("/logout", post(logout))
}

/// Routes that read the resolved session.
pub fn session_router() -> Router {
    Router::new().route("/me", get(me))
}

pub async fn login(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> Response {
    let credentials = match parse_credentials(&body) {
        Ok(c) => c,
        Err(response) => return response,
    };

    let user = match services
        .authenticator
        .authenticate(
            &credentials.email,
            &credentials.password,
            credentials.role.as_deref(),
        )
        .await
    {
        Ok(user) => user,
        Err(err) => return errors::auth_error_to_response(err, true),
    };

    issue_session(&services, &user, LoginResponse {
        message: LOGIN_MESSAGE,
        user: user.summary(),
    })
}

/// Back-office entry point: requires at least `editor`.
pub async fn admin_login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Response {
    let credentials = match parse_credentials(&body) {
        Ok(c) => c,
        Err(response) => return response,
    };

    let user = match services
        .authenticator
        .authenticate(
            &credentials.email,
            &credentials.password,
            Some(Role::Editor.as_str()),
        )
        .await
    {
        Ok(user) => user,
        Err(err) => return errors::auth_error_to_response(err, false),
    };

    issue_session(&services, &user, AdminLoginResponse {
        message: ADMIN_LOGIN_MESSAGE,
        user: AdminUser {
            name: user.name.clone(),
            email: user.email.clone(),
        },
    })
}

pub async fn me(current: Option<Extension<CurrentUser>>) -> Json<MeResponse> {
    let user = current.map(|Extension(current)| current.into_inner());
    Json(MeResponse {
        authenticated: user.is_some(),
        user,
    })
}

/// Stateless: only the cookie is cleared; issued tokens stay valid until
/// they expire.
pub async fn logout(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let body = Json(LogoutResponse {
        success: true,
        message: LOGOUT_MESSAGE,
    });

    match services.cookies.clear_session_cookie() {
        Ok(cookie) => (StatusCode::OK, [(SET_COOKIE, cookie)], body).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to build logout cookie");
            (StatusCode::OK, body).into_response()
        }
    }
}

fn parse_credentials(body: &Bytes) -> Result<Credentials, Response> {
    let invalid_request =
        || errors::json_error(StatusCode::BAD_REQUEST, "invalid_request", INVALID_REQUEST_MESSAGE);

    let value: serde_json::Value = serde_json::from_slice(body).map_err(|_| invalid_request())?;

    Credentials::from_json(&value).map_err(|e| match e {
        CredentialsError::NotAnObject => invalid_request(),
        CredentialsError::InvalidShape => errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_credentials",
            newsroom_auth::INVALID_CREDENTIALS_MESSAGE,
        ),
    })
}

/// Sign a token carrying the user's role and set it as the session cookie.
fn issue_session<B: Serialize>(services: &AppServices, user: &User, body: B) -> Response {
    let options = TokenOptions {
        role: Some(user.role),
        ..TokenOptions::default()
    };

    let token = match services.tokens.create_token_with(&user.id, options) {
        Ok(token) => token,
        Err(err) => return errors::auth_error_to_response(err, false),
    };

    let cookie = match services.cookies.session_cookie(&token) {
        Ok(cookie) => cookie,
        Err(err) => {
            tracing::error!(error = %err, "failed to build session cookie");
            return errors::internal_error();
        }
    };

    tracing::info!(user_id = %user.id, role = %user.role, "session issued");
    (StatusCode::OK, [(SET_COOKIE, cookie)], Json(body)).into_response()
}
