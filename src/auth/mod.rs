// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Telegram login-widget authentication for the gate.
//!
//! ## Auth Flow
//!
//! 1. An unauthenticated visitor gets the 401 page with the Telegram login widget
//! 2. The widget redirects to `/_/login` with the signed ticket in the query string
//! 3. The gate:
//!    - Drops every non-ticket parameter
//!    - Verifies `hash` = HMAC-SHA256(SHA256(bot token), data-check string)
//!    - Rejects tickets older than the freshness window
//!    - Checks the user id / username against the allow-list
//! 4. On success the ticket is stored in the `.auth` cookie, and every later
//!    request repeats the checks of step 3 against that cookie
//!
//! ## Security
//!
//! - A tampered ticket is reported exactly like a missing one
//! - Signatures are compared in constant time
//! - The session cookie expires with the ticket, not with the login request
//! - Nothing is cached between requests: allow-list changes take effect on restart

pub mod access;
pub mod allowed;
pub mod error;
pub mod extractor;
pub mod session;
pub mod signature;
pub mod ticket;

pub use access::{AccessOutcome, AuthService};
pub use allowed::AllowedUsers;
pub use error::Rejection;
pub use extractor::{LoginTicket, SessionTicket};
pub use session::AUTH_COOKIE_NAME;
pub use signature::BotSecret;
pub use ticket::AuthTicket;
