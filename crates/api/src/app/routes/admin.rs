use axum::extract::Extension;
use axum::routing::get;
use axum::{Json, Router};

use crate::app::dto::WhoAmIResponse;
use crate::context::CurrentUser;

/// Back-office routes. Callers wrap this router with the role guard.
pub fn router() -> Router {
    Router::new().route("/whoami", get(whoami))
}

pub async fn whoami(Extension(current): Extension<CurrentUser>) -> Json<WhoAmIResponse> {
    let user = current.into_inner();
    Json(WhoAmIResponse {
        name: user.name,
        email: user.email,
        role: user.role,
    })
}
