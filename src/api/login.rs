// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::auth::{session::login_cookie, LoginTicket, Rejection};
use crate::pages::PageModel;
use crate::state::AppState;

/// Where to send the user after a successful login.
///
/// Only local paths are accepted; anything else (absolute URLs,
/// protocol-relative `//host` forms, values that are not valid header
/// text) falls back to `/`.
pub fn return_url(query: Option<&str>) -> String {
    let requested = query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(name, _)| name == "return_url")
            .map(|(_, value)| value.into_owned())
    });

    match requested {
        Some(url)
            if url.starts_with('/')
                && !url.starts_with("//")
                && !url.starts_with("/\\")
                && HeaderValue::from_str(&url).is_ok() =>
        {
            url
        }
        _ => "/".to_string(),
    }
}

/// Login callback for the Telegram widget.
///
/// On success the ticket becomes the session cookie and the user is
/// redirected to `return_url`. Every failure gets the 403 page.
pub async fn login(
    State(state): State<AppState>,
    LoginTicket(ticket): LoginTicket,
    uri: Uri,
) -> Response {
    let outcome = state.auth.check_access(ticket.as_ref());
    let location = return_url(uri.query());

    match (Rejection::for_login(outcome), ticket) {
        (None, Some(ticket)) => {
            tracing::info!(
                user_id = %ticket.id,
                username = %ticket.username,
                "logged in"
            );
            let cookie = login_cookie(&ticket, state.auth.max_auth_age());
            let location = HeaderValue::from_str(&location)
                .unwrap_or_else(|_| HeaderValue::from_static("/"));
            (
                StatusCode::FOUND,
                [(header::LOCATION, location), (header::SET_COOKIE, cookie)],
            )
                .into_response()
        }
        (rejection, _) => {
            let rejection = rejection.unwrap_or(Rejection::Forbidden);
            tracing::debug!(%outcome, "login rejected");
            state.pages.respond(
                rejection.status_code(),
                rejection.page(),
                &PageModel::new(state.auth.bot_name(), &location),
            )
        }
    }
}
