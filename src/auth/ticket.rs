// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login ticket produced by the Telegram login widget.
//!
//! ## Transport Forms
//!
//! - **Login**: the widget redirects to `/_/login?id=..&username=..&hash=..`.
//! - **Session**: afterwards the same fields live in the `.auth` cookie as a
//!   URL-escaped flat JSON object (`{"auth_date":"..","hash":"..",..}`).
//!
//! Only the fields in [`TICKET_FIELDS`] survive parsing. Everything else is
//! dropped before the signature is checked, so foreign parameters can neither
//! be smuggled into the cookie nor influence the data-check string.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

/// Field names recognised in a ticket.
pub const TICKET_FIELDS: [&str; 7] = [
    "auth_date",
    "first_name",
    "hash",
    "id",
    "last_name",
    "photo_url",
    "username",
];

/// A well-formed login ticket.
///
/// `id`, `username`, `auth_date` and `hash` are mandatory; a payload missing
/// any of them never becomes an `AuthTicket`. Numeric fields stay
/// string-encoded exactly as signed and are decoded on access.
///
/// Fields are declared in alphabetical order so the serialized JSON matches
/// the key order of a sorted map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTicket {
    /// Unix timestamp (seconds) of the widget login.
    pub auth_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Lowercase hex HMAC-SHA256 over the data-check string.
    pub hash: String,
    /// Numeric Telegram user id.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Telegram handle, without `@`.
    pub username: String,
}

impl AuthTicket {
    /// Build a ticket from `(name, value)` pairs.
    ///
    /// The first occurrence of a name wins. Unknown names are ignored.
    /// Returns `None` when a mandatory field is missing.
    pub fn from_fields<I, K, V>(fields: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut known: BTreeMap<&'static str, String> = BTreeMap::new();
        for (name, value) in fields {
            let Some(field) = TICKET_FIELDS.iter().find(|f| **f == name.as_ref()) else {
                continue;
            };
            known.entry(*field).or_insert_with(|| value.into());
        }

        Some(Self {
            auth_date: known.remove("auth_date")?,
            hash: known.remove("hash")?,
            id: known.remove("id")?,
            username: known.remove("username")?,
            first_name: known.remove("first_name"),
            last_name: known.remove("last_name"),
            photo_url: known.remove("photo_url"),
        })
    }

    /// Parse the widget redirect query string (without the leading `?`).
    pub fn from_query(query: &str) -> Option<Self> {
        Self::from_fields(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Parse the value of the `.auth` cookie.
    ///
    /// Any decoding problem yields `None`; the caller cannot tell a garbled
    /// cookie from a missing one.
    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let unescaped = query_unescape(value)?;
        let fields: BTreeMap<String, String> = serde_json::from_str(&unescaped).ok()?;
        Self::from_fields(fields)
    }

    /// Serialize into the `.auth` cookie value.
    pub fn to_cookie_value(&self) -> String {
        // A struct of strings always serializes.
        let json = serde_json::to_string(self).unwrap_or_default();
        url::form_urlencoded::byte_serialize(json.as_bytes()).collect()
    }

    /// All present fields as `(name, value)` pairs, `hash` included.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            ("auth_date", self.auth_date.as_str()),
            ("hash", self.hash.as_str()),
            ("id", self.id.as_str()),
            ("username", self.username.as_str()),
        ];
        let optional = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("photo_url", &self.photo_url),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.push((name, value.as_str()));
            }
        }
        fields
    }

    /// Canonical message signed by Telegram: every field except `hash` as
    /// `name=value`, sorted, joined by `\n`.
    pub fn data_check_string(&self) -> String {
        let mut lines: Vec<String> = self
            .fields()
            .into_iter()
            .filter(|(name, _)| *name != "hash")
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        lines.sort();
        lines.join("\n")
    }

    /// Numeric user id, `None` if it does not parse.
    pub fn user_id(&self) -> Option<i64> {
        self.id.parse().ok()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Login time, `None` if `auth_date` does not parse.
    pub fn auth_date(&self) -> Option<DateTime<Utc>> {
        let secs: i64 = self.auth_date.parse().ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

/// Undo `application/x-www-form-urlencoded` escaping (`+` is a space).
///
/// Fails on a `%` not followed by two hex digits.
fn query_unescape(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let well_formed = bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'%')
        .all(|(i, _)| {
            bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        });
    if !well_formed {
        return None;
    }

    let plus_decoded = value.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AuthTicket {
        AuthTicket {
            auth_date: "1700000000".to_string(),
            first_name: Some("Alice".to_string()),
            hash: "00ff".to_string(),
            id: "123".to_string(),
            last_name: None,
            photo_url: Some("https://t.me/i/userpic/320/alice.jpg".to_string()),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn from_query_keeps_first_value_and_drops_unknown() {
        let ticket = AuthTicket::from_query(
            "id=123&id=456&username=alice&auth_date=1700000000&hash=abc&return_url=%2Fdocs&admin=1",
        )
        .unwrap();

        assert_eq!(ticket.id, "123");
        assert_eq!(ticket.username, "alice");
        assert!(ticket.fields().iter().all(|(name, _)| TICKET_FIELDS.contains(name)));
        assert!(!ticket.data_check_string().contains("return_url"));
    }

    #[test]
    fn missing_mandatory_field_is_no_ticket() {
        for missing in ["id", "username", "auth_date", "hash"] {
            let fields: Vec<(&str, &str)> = [
                ("id", "1"),
                ("username", "bob"),
                ("auth_date", "1"),
                ("hash", "aa"),
            ]
            .into_iter()
            .filter(|(name, _)| *name != missing)
            .collect();
            assert!(AuthTicket::from_fields(fields).is_none(), "without {missing}");
        }
    }

    #[test]
    fn cookie_round_trip() {
        let ticket = sample();
        let value = ticket.to_cookie_value();

        assert!(!value.contains('"'));
        assert!(!value.contains(';'));
        assert_eq!(AuthTicket::from_cookie_value(&value), Some(ticket));
    }

    #[test]
    fn cookie_with_extra_fields_is_normalized() {
        let json = r#"{"id":"1","username":"bob","auth_date":"5","hash":"aa","role":"admin"}"#;
        let value: String = url::form_urlencoded::byte_serialize(json.as_bytes()).collect();

        let ticket = AuthTicket::from_cookie_value(&value).unwrap();
        assert_eq!(ticket.data_check_string(), "auth_date=5\nid=1\nusername=bob");
    }

    #[test]
    fn garbage_cookie_is_no_ticket() {
        assert!(AuthTicket::from_cookie_value("not-json").is_none());
        assert!(AuthTicket::from_cookie_value("%7B%22id%22%3A1%7D").is_none());
        // Non-string values are rejected, as in a flat string map.
        let json = r#"{"id":1,"username":"bob","auth_date":"5","hash":"aa"}"#;
        let value: String = url::form_urlencoded::byte_serialize(json.as_bytes()).collect();
        assert!(AuthTicket::from_cookie_value(&value).is_none());
    }

    #[test]
    fn malformed_escape_in_cookie_is_no_ticket() {
        let json = r#"{"auth_date":"5","first_name":"Q","hash":"aa","id":"1","username":"bob"}"#;
        let value: String = url::form_urlencoded::byte_serialize(json.as_bytes()).collect();
        assert!(AuthTicket::from_cookie_value(&value).is_some());

        for bad in ["%zz", "%4", "%"] {
            let tampered = value.replacen('Q', bad, 1);
            assert!(AuthTicket::from_cookie_value(&tampered).is_none(), "{bad}");
        }
        let escaped_percent = value.replacen('Q', "%25zz", 1);
        assert_eq!(
            AuthTicket::from_cookie_value(&escaped_percent)
                .unwrap()
                .first_name
                .as_deref(),
            Some("%zz")
        );
    }

    #[test]
    fn data_check_string_is_sorted_and_excludes_hash() {
        assert_eq!(
            sample().data_check_string(),
            "auth_date=1700000000\nfirst_name=Alice\nid=123\n\
             photo_url=https://t.me/i/userpic/320/alice.jpg\nusername=alice"
        );
    }

    #[test]
    fn data_check_string_ignores_field_order() {
        let a = AuthTicket::from_query("id=1&username=bob&auth_date=9&hash=x&first_name=Bob")
            .unwrap();
        let b = AuthTicket::from_query("first_name=Bob&hash=x&auth_date=9&username=bob&id=1")
            .unwrap();
        assert_eq!(a.data_check_string(), b.data_check_string());
    }

    #[test]
    fn normalizing_twice_is_a_no_op() {
        let ticket = sample();
        let again = AuthTicket::from_fields(ticket.fields()).unwrap();
        assert_eq!(again, ticket);
    }

    #[test]
    fn numeric_fields_fail_safe() {
        let mut ticket = sample();
        assert_eq!(ticket.user_id(), Some(123));
        assert_eq!(ticket.auth_date().map(|d| d.timestamp()), Some(1_700_000_000));

        ticket.id = "12a".to_string();
        ticket.auth_date = "yesterday".to_string();
        assert_eq!(ticket.user_id(), None);
        assert_eq!(ticket.auth_date(), None);
    }

    #[test]
    fn plus_in_cookie_decodes_to_space() {
        let mut ticket = sample();
        ticket.first_name = Some("Alice Liddell".to_string());
        let value = ticket.to_cookie_value();
        assert!(value.contains('+'));
        assert_eq!(
            AuthTicket::from_cookie_value(&value).unwrap().first_name.as_deref(),
            Some("Alice Liddell")
        );
    }
}
