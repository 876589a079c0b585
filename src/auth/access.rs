// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access decision for a (possibly absent) ticket.

use chrono::{DateTime, TimeDelta, Utc};

use super::allowed::AllowedUsers;
use super::signature::BotSecret;
use super::ticket::AuthTicket;

/// Result of checking a request's ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessOutcome {
    /// Signed, fresh and allow-listed.
    HasAccess,
    /// Signed and fresh, but the user is not on the allow-list.
    NoAccess,
    /// Missing, malformed, or carrying a bad signature.
    NoTicket,
    /// Correctly signed but older than the freshness window.
    TicketExpired,
}

impl AccessOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOutcome::HasAccess => "has_access",
            AccessOutcome::NoAccess => "no_access",
            AccessOutcome::NoTicket => "no_ticket",
            AccessOutcome::TicketExpired => "ticket_expired",
        }
    }
}

impl std::fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket verification service shared by all handlers.
///
/// Holds only read-only state: the derived secret, the allow-list, the
/// freshness window and the bot's username (for the login widget).
#[derive(Debug)]
pub struct AuthService {
    secret: BotSecret,
    allowed_users: AllowedUsers,
    max_auth_age: TimeDelta,
    bot_name: String,
}

impl AuthService {
    pub fn new(
        secret: BotSecret,
        allowed_users: AllowedUsers,
        max_auth_age: TimeDelta,
        bot_name: impl Into<String>,
    ) -> Self {
        Self {
            secret,
            allowed_users,
            max_auth_age,
            bot_name: bot_name.into(),
        }
    }

    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    pub fn max_auth_age(&self) -> TimeDelta {
        self.max_auth_age
    }

    /// Decide access against the current time.
    pub fn check_access(&self, ticket: Option<&AuthTicket>) -> AccessOutcome {
        self.check_access_at(ticket, Utc::now())
    }

    /// Decide access as of `now`.
    ///
    /// Checks run in order and the first failure wins: presence, signature,
    /// freshness, allow-list. A bad signature reports `NoTicket` so a tampered
    /// ticket looks exactly like a missing one.
    pub fn check_access_at(&self, ticket: Option<&AuthTicket>, now: DateTime<Utc>) -> AccessOutcome {
        let Some(ticket) = ticket else {
            return AccessOutcome::NoTicket;
        };

        if !self.secret.verify(ticket) {
            return AccessOutcome::NoTicket;
        }

        // An unparsable auth_date counts as infinitely old.
        let fresh = ticket
            .auth_date()
            .is_some_and(|auth_date| now - auth_date <= self.max_auth_age);
        if !fresh {
            return AccessOutcome::TicketExpired;
        }

        if !self.allowed_users.is_allowed(ticket) {
            return AccessOutcome::NoAccess;
        }

        AccessOutcome::HasAccess
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const BOT_TOKEN: &str = "110201543:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw";
    pub(crate) const WINDOW_SECS: i64 = 14 * 24 * 60 * 60;

    pub(crate) fn service(allowed: &str) -> AuthService {
        AuthService::new(
            BotSecret::from_bot_token(BOT_TOKEN),
            AllowedUsers::parse(allowed),
            TimeDelta::seconds(WINDOW_SECS),
            "gate_bot",
        )
    }

    /// A ticket signed with [`BOT_TOKEN`].
    pub(crate) fn signed_ticket(id: &str, username: &str, auth_date: i64) -> AuthTicket {
        let mut ticket = AuthTicket::from_fields([
            ("id", id.to_string()),
            ("username", username.to_string()),
            ("first_name", "Test".to_string()),
            ("auth_date", auth_date.to_string()),
            ("hash", String::new()),
        ])
        .unwrap();
        ticket.hash = BotSecret::from_bot_token(BOT_TOKEN).sign(&ticket);
        ticket
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000, 0).unwrap()
    }

    #[test]
    fn absent_ticket_is_no_ticket() {
        assert_eq!(service("1").check_access_at(None, now()), AccessOutcome::NoTicket);
    }

    #[test]
    fn bad_signature_is_no_ticket() {
        let mut ticket = signed_ticket("1", "alice", now().timestamp());
        ticket.username = "mallory".to_string();
        assert_eq!(
            service("1 @mallory").check_access_at(Some(&ticket), now()),
            AccessOutcome::NoTicket
        );
    }

    #[test]
    fn signature_is_checked_before_freshness() {
        let mut ticket = signed_ticket("1", "alice", 0);
        ticket.hash = "00".repeat(32);
        assert_eq!(
            service("1").check_access_at(Some(&ticket), now()),
            AccessOutcome::NoTicket
        );
    }

    #[test]
    fn freshness_window_boundaries() {
        let svc = service("1");
        let stale = signed_ticket("1", "alice", now().timestamp() - (WINDOW_SECS + 1));
        let fresh = signed_ticket("1", "alice", now().timestamp() - (WINDOW_SECS - 1));
        let exact = signed_ticket("1", "alice", now().timestamp() - WINDOW_SECS);

        assert_eq!(svc.check_access_at(Some(&stale), now()), AccessOutcome::TicketExpired);
        assert_eq!(svc.check_access_at(Some(&fresh), now()), AccessOutcome::HasAccess);
        assert_eq!(svc.check_access_at(Some(&exact), now()), AccessOutcome::HasAccess);
    }

    #[test]
    fn expiry_is_checked_before_allow_list() {
        let stale = signed_ticket("2", "bob", now().timestamp() - WINDOW_SECS - 60);
        assert_eq!(
            service("1").check_access_at(Some(&stale), now()),
            AccessOutcome::TicketExpired
        );
    }

    #[test]
    fn unparsable_auth_date_is_expired() {
        let mut ticket = AuthTicket::from_fields([
            ("id", "1"),
            ("username", "alice"),
            ("auth_date", "soon"),
            ("hash", ""),
        ])
        .unwrap();
        ticket.hash = BotSecret::from_bot_token(BOT_TOKEN).sign(&ticket);

        assert_eq!(
            service("1").check_access_at(Some(&ticket), now()),
            AccessOutcome::TicketExpired
        );
    }

    #[test]
    fn unlisted_user_is_no_access() {
        let ticket = signed_ticket("2", "bob", now().timestamp());
        assert_eq!(
            service("1 @alice").check_access_at(Some(&ticket), now()),
            AccessOutcome::NoAccess
        );
    }

    #[test]
    fn listed_by_username_has_access() {
        let ticket = signed_ticket("2", "bob", now().timestamp());
        assert_eq!(
            service("t.me/bob").check_access_at(Some(&ticket), now()),
            AccessOutcome::HasAccess
        );
    }

    #[test]
    fn future_auth_date_is_fresh() {
        let ticket = signed_ticket("1", "alice", now().timestamp() + 3600);
        assert_eq!(
            service("1").check_access_at(Some(&ticket), now()),
            AccessOutcome::HasAccess
        );
    }

    #[test]
    fn outcome_names() {
        assert_eq!(AccessOutcome::TicketExpired.to_string(), "ticket_expired");
        assert_eq!(AccessOutcome::HasAccess.as_str(), "has_access");
    }
}
