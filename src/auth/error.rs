// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rejections produced by the gate.

use axum::http::StatusCode;

use super::access::AccessOutcome;

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// No usable session: missing, tampered or expired ticket.
    Unauthorized,
    /// Valid session for a user who is not allow-listed.
    Forbidden,
}

impl Rejection {
    /// Rejection for a content request, `None` when it may pass.
    pub fn for_content(outcome: AccessOutcome) -> Option<Self> {
        match outcome {
            AccessOutcome::HasAccess => None,
            AccessOutcome::NoAccess => Some(Rejection::Forbidden),
            AccessOutcome::NoTicket | AccessOutcome::TicketExpired => {
                Some(Rejection::Unauthorized)
            }
        }
    }

    /// Rejection for a login attempt, `None` when it succeeded.
    ///
    /// Every failed login is answered with the same forbidden page.
    pub fn for_login(outcome: AccessOutcome) -> Option<Self> {
        match outcome {
            AccessOutcome::HasAccess => None,
            _ => Some(Rejection::Forbidden),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Rejection::Unauthorized => StatusCode::UNAUTHORIZED,
            Rejection::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    /// Template rendered for this rejection.
    pub fn page(&self) -> &'static str {
        match self {
            Rejection::Unauthorized => "401.html",
            Rejection::Forbidden => "403.html",
        }
    }
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Unauthorized => write!(f, "Login required"),
            Rejection::Forbidden => write!(f, "Access denied"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_rejections() {
        assert_eq!(Rejection::for_content(AccessOutcome::HasAccess), None);
        assert_eq!(
            Rejection::for_content(AccessOutcome::NoAccess),
            Some(Rejection::Forbidden)
        );
        assert_eq!(
            Rejection::for_content(AccessOutcome::NoTicket),
            Some(Rejection::Unauthorized)
        );
        assert_eq!(
            Rejection::for_content(AccessOutcome::TicketExpired),
            Some(Rejection::Unauthorized)
        );
    }

    #[test]
    fn failed_login_is_forbidden() {
        assert_eq!(Rejection::for_login(AccessOutcome::HasAccess), None);
        for outcome in [
            AccessOutcome::NoAccess,
            AccessOutcome::NoTicket,
            AccessOutcome::TicketExpired,
        ] {
            assert_eq!(Rejection::for_login(outcome), Some(Rejection::Forbidden));
        }
    }

    #[test]
    fn status_codes() {
        assert_eq!(Rejection::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Rejection::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(Rejection::Forbidden.page(), "403.html");
    }
}
