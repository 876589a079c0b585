// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ticket signature verification.
//!
//! Telegram signs login tickets with `HMAC-SHA256(SHA256(bot_token), data_check_string)`
//! and sends the lowercase hex digest in the `hash` field. The key is derived
//! once at startup and shared read-only by every request.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::ticket::AuthTicket;

type HmacSha256 = Hmac<Sha256>;

/// HMAC key derived from the bot token.
#[derive(Clone)]
pub struct BotSecret([u8; 32]);

impl BotSecret {
    /// Derive the secret as `SHA256(bot_token)`.
    pub fn from_bot_token(bot_token: &str) -> Self {
        Self(Sha256::digest(bot_token.as_bytes()).into())
    }

    fn mac(&self, ticket: &AuthTicket) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.0).expect("HMAC key length is always valid");
        mac.update(ticket.data_check_string().as_bytes());
        mac
    }

    /// Lowercase hex signature Telegram would attach to `ticket`.
    pub fn sign(&self, ticket: &AuthTicket) -> String {
        hex::encode(self.mac(ticket).finalize().into_bytes())
    }

    /// Check the ticket's `hash` against the recomputed signature.
    ///
    /// The comparison is constant-time. Anything that is not a lowercase hex
    /// digest is rejected outright.
    pub fn verify(&self, ticket: &AuthTicket) -> bool {
        if ticket
            .hash
            .bytes()
            .any(|b| !matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return false;
        }
        let Ok(claimed) = hex::decode(&ticket.hash) else {
            return false;
        };
        self.mac(ticket).verify_slice(&claimed).is_ok()
    }
}

impl std::fmt::Debug for BotSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BotSecret(..)")
    }
}
