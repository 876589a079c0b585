// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Static allow-list of Telegram users.

use std::collections::BTreeSet;

use super::ticket::AuthTicket;

/// Prefixes stripped from handles, applied in this order.
const HANDLE_PREFIXES: [&str; 4] = ["@", "t.me/", "http://t.me/", "https://t.me/"];

/// Users permitted through the gate.
///
/// Built once from `TG_ALLOWED_USERS` and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedUsers {
    user_ids: BTreeSet<i64>,
    usernames: BTreeSet<String>,
}

impl AllowedUsers {
    /// Parse an allow-list such as `"123, @alice; https://t.me/bob"`.
    ///
    /// Entries are separated by commas, semicolons or spaces. Integers are
    /// user ids; anything else is a handle with its `@` / `t.me/` prefix removed.
    pub fn parse(raw: &str) -> Self {
        let mut users = Self::default();

        for entry in raw
            .split([',', ';', ' '])
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
        {
            if let Ok(id) = entry.parse::<i64>() {
                users.user_ids.insert(id);
                continue;
            }

            let handle = HANDLE_PREFIXES
                .iter()
                .fold(entry, |handle, prefix| handle.strip_prefix(prefix).unwrap_or(handle));
            if !handle.is_empty() {
                users.usernames.insert(handle.to_string());
            }
        }

        users
    }

    pub fn user_ids(&self) -> &BTreeSet<i64> {
        &self.user_ids
    }

    pub fn usernames(&self) -> &BTreeSet<String> {
        &self.usernames
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty() && self.usernames.is_empty()
    }

    /// Whether the ticket's id or (case-sensitive) username is listed.
    pub fn is_allowed(&self, ticket: &AuthTicket) -> bool {
        ticket
            .user_id()
            .is_some_and(|id| self.user_ids.contains(&id))
            || self.usernames.contains(ticket.username())
    }

    /// Log the configured entries.
    pub fn log(&self) {
        tracing::info!("access is configured for user(s):");
        for id in &self.user_ids {
            tracing::info!("- {id}");
        }
        for name in &self.usernames {
            tracing::info!("- @{name}");
        }
    }
}
