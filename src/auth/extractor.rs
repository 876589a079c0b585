// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for login tickets.
//!
//! Neither extractor rejects: a missing or garbled ticket is simply `None`,
//! and the access decision turns that into `NoTicket`.
//!
//! ```rust,ignore
//! async fn login(LoginTicket(ticket): LoginTicket, State(state): State<AppState>) {
//!     match state.auth.check_access(ticket.as_ref()) { /* ... */ }
//! }
//! ```

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::session::ticket_from_headers;
use super::ticket::AuthTicket;

/// Ticket carried by the `.auth` session cookie.
pub struct SessionTicket(pub Option<AuthTicket>);

impl<S: Send + Sync> FromRequestParts<S> for SessionTicket {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionTicket(ticket_from_headers(&parts.headers)))
    }
}

/// Ticket carried by the login widget redirect's query string.
pub struct LoginTicket(pub Option<AuthTicket>);

impl<S: Send + Sync> FromRequestParts<S> for LoginTicket {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ticket = parts.uri.query().and_then(AuthTicket::from_query);
        Ok(LoginTicket(ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[tokio::test]
    async fn login_ticket_from_query() {
        let mut parts = parts(
            Request::builder()
                .uri("/_/login?id=7&username=neo&auth_date=1&hash=ab&return_url=%2F")
                .body(())
                .unwrap(),
        );

        let LoginTicket(ticket) = LoginTicket::from_request_parts(&mut parts, &()).await.unwrap();
        let ticket = ticket.unwrap();
        assert_eq!(ticket.id, "7");
        assert_eq!(ticket.username, "neo");
    }

    #[tokio::test]
    async fn login_without_query_is_none() {
        let mut parts = parts(Request::builder().uri("/_/login").body(()).unwrap());

        let LoginTicket(ticket) = LoginTicket::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(ticket.is_none());
    }

    #[tokio::test]
    async fn session_ticket_from_cookie() {
        let ticket = AuthTicket::from_query("id=7&username=neo&auth_date=1&hash=ab").unwrap();
        let mut parts = parts(
            Request::builder()
                .uri("/")
                .header("Cookie", format!(".auth={}", ticket.to_cookie_value()))
                .body(())
                .unwrap(),
        );

        let SessionTicket(found) = SessionTicket::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found, Some(ticket));
    }

    #[tokio::test]
    async fn session_ticket_without_cookie_is_none() {
        let mut parts = parts(Request::builder().uri("/").body(()).unwrap());

        let SessionTicket(found) = SessionTicket::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(found.is_none());
    }
}
