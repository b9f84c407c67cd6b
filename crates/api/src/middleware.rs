//! Session resolution and role guards.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use newsroom_auth::{AuthResult, Role, INSUFFICIENT_ROLE_MESSAGE};

use crate::app::errors::{AUTHENTICATION_REQUIRED_MESSAGE, json_error};
use crate::app::services::AppServices;
use crate::context::{CurrentUser, SessionRejection};
use crate::cookies::extract_session_token;

/// Resolve the session token (cookie or bearer) and attach the outcome to
/// the request. Never rejects by itself.
pub async fn session_middleware(
    State(services): State<Arc<AppServices>>,
    mut req: Request,
    next: Next,
) -> Response {
    let outcome = {
        let token = extract_session_token(req.headers());
        services.sessions.resolve(token).await
    };

    match outcome {
        AuthResult::Authenticated(user) => {
            req.extensions_mut().insert(CurrentUser::new(user));
        }
        AuthResult::Unauthenticated(rejection) => {
            req.extensions_mut().insert(SessionRejection(rejection));
        }
    }

    next.run(req).await
}

/// Require an authenticated user whose role satisfies `required`.
///
/// Must run inside [`session_middleware`].
pub async fn require_role(State(required): State<Role>, req: Request, next: Next) -> Response {
    let Some(current) = req.extensions().get::<CurrentUser>() else {
        if let Some(SessionRejection(rejection)) = req.extensions().get::<SessionRejection>() {
            tracing::info!(reason = rejection.as_str(), "request rejected: no session");
        }
        return json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            AUTHENTICATION_REQUIRED_MESSAGE,
        );
    };

    if !current.role().satisfies(&required) {
        tracing::info!(
            role = %current.role(),
            required = %required,
            "request rejected: role too low"
        );
        return json_error(StatusCode::FORBIDDEN, "forbidden", INSUFFICIENT_ROLE_MESSAGE);
    }

    next.run(req).await
}
