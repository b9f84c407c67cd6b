use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use newsroom_auth::{AuthError, INTERNAL_ERROR_MESSAGE, INVALID_CREDENTIALS_MESSAGE};

pub const INVALID_REQUEST_MESSAGE: &str = "Requête invalide";
pub const AUTHENTICATION_REQUIRED_MESSAGE: &str = "Authentification requise";
pub const STORE_UNAVAILABLE_MESSAGE: &str = "Service temporairement indisponible";

/// Map an authentication failure onto an HTTP response.
///
/// `merge_role_failure` folds an insufficient role into the generic
/// invalid-credentials 401 so callers cannot tell the two apart.
pub fn auth_error_to_response(err: AuthError, merge_role_failure: bool) -> axum::response::Response {
    if err.is_client_error() {
        tracing::info!(reason = %err, "authentication refused");
    }

    match err {
        AuthError::InvalidCredentials => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            INVALID_CREDENTIALS_MESSAGE,
        ),
        AuthError::InsufficientRole if merge_role_failure => json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            INVALID_CREDENTIALS_MESSAGE,
        ),
        AuthError::InsufficientRole => {
            json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
        }
        AuthError::Store(e) => {
            tracing::error!(error = %e, "user store unavailable");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                STORE_UNAVAILABLE_MESSAGE,
            )
        }
        other => {
            tracing::error!(error = ?other, "authentication failed on the server side");
            internal_error()
        }
    }
}

pub fn internal_error() -> axum::response::Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        INTERNAL_ERROR_MESSAGE,
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
