// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Telegram Auth Gate - Login-Widget Access Gate
//!
//! Sits in front of a backend and lets through only the Telegram users on
//! its allow-list. Users sign in with the Telegram login widget; the signed
//! ticket it returns becomes the session cookie.
//!
//! ## Modules
//!
//! - `api` - HTTP routes (Axum): login, logout, health and the gated fallback
//! - `auth` - Ticket parsing, signature checks and access decisions
//! - `config` - Environment configuration
//! - `pages` - HTML error pages with the login widget
//! - `telegram` - Bot API client (`getMe`)
//! - `upstream` - Forwarding to the protected backend

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod pages;
pub mod state;
pub mod telegram;
pub mod upstream;
