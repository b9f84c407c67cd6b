//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/token/authenticator wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

use newsroom_auth::Role;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let session =
        axum::middleware::from_fn_with_state(services.clone(), middleware::session_middleware);

    let auth = routes::auth::router().merge(routes::auth::session_router().layer(session.clone()));

    // Back office: editor or above.
    let admin = routes::admin::router()
        .layer(axum::middleware::from_fn_with_state(
            Role::Editor,
            middleware::require_role,
        ))
        .layer(session);

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/auth", auth)
        .nest("/api/admin", admin)
        .layer(Extension(services))
}
