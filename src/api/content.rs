// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::auth::{session::logout_cookie, AccessOutcome, Rejection, SessionTicket};
use crate::pages::PageModel;
use crate::state::AppState;

/// Every path outside `/_/`: forward if the session cookie grants access.
///
/// A user who is no longer allow-listed also loses the cookie; an expired
/// or missing session only gets the login page.
pub async fn content(
    State(state): State<AppState>,
    SessionTicket(ticket): SessionTicket,
    request: Request,
) -> Response {
    let outcome = state.auth.check_access(ticket.as_ref());

    let Some(rejection) = Rejection::for_content(outcome) else {
        let client_ip = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        return match state.upstream.forward(request, client_ip).await {
            Ok(response) => response,
            Err(e) => e.into_response(),
        };
    };

    tracing::debug!(%outcome, path = %request.uri().path(), "request rejected");

    let return_to = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let mut response = state.pages.respond(
        rejection.status_code(),
        rejection.page(),
        &PageModel::new(state.auth.bot_name(), return_to),
    );
    if outcome == AccessOutcome::NoAccess {
        response
            .headers_mut()
            .append(header::SET_COOKIE, logout_cookie());
    }
    response
}
