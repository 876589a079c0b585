// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

pub mod content;
pub mod health;
pub mod login;
pub mod logout;

/// Login widget callback.
pub const LOGIN_PATH: &str = "/_/login";
pub const LOGOUT_PATH: &str = "/_/logout";
pub const HEALTH_PATH: &str = "/_/health";

/// Build the gate. The `/_/` endpoints are served locally; every other
/// path goes through the session check and, on success, to the backend.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(LOGIN_PATH, any(login::login))
        .route(LOGOUT_PATH, any(logout::logout))
        .route(HEALTH_PATH, get(health::liveness))
        .fallback(content::content)
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
