// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
};

use crate::auth::session::logout_cookie;

/// Clear the session cookie and go back to `/`.
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, HeaderValue::from_static("/")),
            (header::SET_COOKIE, logout_cookie()),
        ],
    )
}
