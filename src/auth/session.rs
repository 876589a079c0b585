// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session cookie issuance and lookup.
//!
//! The session is the verified login ticket itself, stored client-side in the
//! `.auth` cookie. Every request re-verifies it, so the cookie carries no
//! server-side state and needs no revocation list.

use axum::http::{header, HeaderMap, HeaderValue};
use chrono::{DateTime, TimeDelta, Utc};

use super::ticket::AuthTicket;

/// Name of the session cookie.
pub const AUTH_COOKIE_NAME: &str = ".auth";

/// `Set-Cookie` value persisting `ticket`.
///
/// The cookie expires at `auth_date + max_auth_age`, i.e. when the ticket
/// itself goes stale, never later than that. Dates past chrono's range are
/// clamped to its maximum.
pub fn login_cookie(ticket: &AuthTicket, max_auth_age: TimeDelta) -> HeaderValue {
    let expires = ticket
        .auth_date()
        .unwrap_or(DateTime::UNIX_EPOCH)
        .checked_add_signed(max_auth_age)
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let cookie = format!(
        "{AUTH_COOKIE_NAME}={}; Path=/; Expires={}; HttpOnly",
        ticket.to_cookie_value(),
        http_date(expires),
    );
    // Cookie values are URL-escaped ASCII.
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| logout_cookie())
}

/// `Set-Cookie` value deleting the session cookie.
pub fn logout_cookie() -> HeaderValue {
    HeaderValue::from_static(
        ".auth=; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; HttpOnly",
    )
}

/// Raw value of the session cookie, if the request carries one.
pub fn auth_cookie_value(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == AUTH_COOKIE_NAME)
        .map(|(_, value)| {
            value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value)
        })
}

/// The ticket stored in the session cookie, if any.
pub fn ticket_from_headers(headers: &HeaderMap) -> Option<AuthTicket> {
    auth_cookie_value(headers).and_then(AuthTicket::from_cookie_value)
}

fn http_date(at: DateTime<Utc>) -> String {
    at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
