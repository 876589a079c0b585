// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup; any problem is fatal.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TG_BOT_TOKEN` | Telegram bot token, also the ticket signing secret | Required |
//! | `TG_ALLOWED_USERS` | User ids / handles separated by `,` `;` or spaces | Required |
//! | `BACKEND_URL` | Protected backend requests are forwarded to | Required |
//! | `LISTEN_ADDR` | Server bind address | `0.0.0.0:8000` |
//! | `MAX_AUTH_AGE_SECS` | Ticket freshness window in seconds, at most 100 years | `1209600` (14 days) |
//! | `TELEGRAM_API_URL` | Telegram Bot API base URL | `https://api.telegram.org` |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS with `TLS_KEY_PATH` | Unset |
//! | `TLS_KEY_PATH` | PEM private key | Unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=info` |

use std::{net::SocketAddr, path::PathBuf};

use chrono::TimeDelta;
use url::Url;

use crate::auth::AllowedUsers;

/// Telegram bot token.
pub const BOT_TOKEN_ENV: &str = "TG_BOT_TOKEN";

/// Raw allow-list specification.
pub const ALLOWED_USERS_ENV: &str = "TG_ALLOWED_USERS";

/// Backend URL.
pub const BACKEND_URL_ENV: &str = "BACKEND_URL";

/// Bind address.
pub const LISTEN_ADDR_ENV: &str = "LISTEN_ADDR";

/// Freshness window in seconds.
pub const MAX_AUTH_AGE_ENV: &str = "MAX_AUTH_AGE_SECS";

/// Telegram Bot API base URL.
pub const TELEGRAM_API_URL_ENV: &str = "TELEGRAM_API_URL";

pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";

/// Logging format selector (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Two weeks.
pub const DEFAULT_MAX_AUTH_AGE_SECS: i64 = 14 * 24 * 60 * 60;

/// Upper bound for the freshness window: one hundred years.
pub const MAX_AUTH_AGE_LIMIT_SECS: i64 = 100 * 365 * 24 * 60 * 60;

pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=info";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing env variable {0}")]
    Missing(&'static str),

    #[error("invalid env variable {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// PEM files for HTTPS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Everything the gate needs at startup.
pub struct GateConfig {
    pub bot_token: String,
    pub allowed_users: AllowedUsers,
    pub backend_url: Url,
    pub listen_addr: SocketAddr,
    pub max_auth_age: TimeDelta,
    pub telegram_api_url: Url,
    pub tls: Option<TlsPaths>,
}

impl std::fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateConfig")
            .field("bot_token", &"<redacted>")
            .field("allowed_users", &self.allowed_users)
            .field("backend_url", &self.backend_url.as_str())
            .field("listen_addr", &self.listen_addr)
            .field("max_auth_age", &self.max_auth_age)
            .field("telegram_api_url", &self.telegram_api_url.as_str())
            .field("tls", &self.tls)
            .finish()
    }
}

impl GateConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load using `lookup` to resolve variables. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        let required = |var: &'static str| get(var).ok_or(ConfigError::Missing(var));

        let bot_token = required(BOT_TOKEN_ENV)?;
        let allowed_users = AllowedUsers::parse(&required(ALLOWED_USERS_ENV)?);
        if allowed_users.is_empty() {
            return Err(ConfigError::Invalid {
                var: ALLOWED_USERS_ENV,
                reason: "no user ids or handles".to_string(),
            });
        }

        let backend_url = parse_http_url(BACKEND_URL_ENV, &required(BACKEND_URL_ENV)?)?;

        let listen_addr: SocketAddr = get(LISTEN_ADDR_ENV)
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .map_err(|e| invalid(LISTEN_ADDR_ENV, e))?;

        let max_auth_age = match get(MAX_AUTH_AGE_ENV) {
            Some(raw) => {
                let secs: i64 = raw.trim().parse().map_err(|e| invalid(MAX_AUTH_AGE_ENV, e))?;
                if secs <= 0 {
                    return Err(invalid(MAX_AUTH_AGE_ENV, "must be positive"));
                }
                if secs > MAX_AUTH_AGE_LIMIT_SECS {
                    return Err(invalid(
                        MAX_AUTH_AGE_ENV,
                        format!("must not exceed {MAX_AUTH_AGE_LIMIT_SECS}"),
                    ));
                }
                TimeDelta::seconds(secs)
            }
            None => TimeDelta::seconds(DEFAULT_MAX_AUTH_AGE_SECS),
        };

        let telegram_api_url = parse_http_url(
            TELEGRAM_API_URL_ENV,
            &get(TELEGRAM_API_URL_ENV).unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
        )?;

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        Ok(Self {
            bot_token,
            allowed_users,
            backend_url,
            listen_addr,
            max_auth_age,
            telegram_api_url,
            tls,
        })
    }
}

fn invalid(var: &'static str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

fn parse_http_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| invalid(var, e))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(invalid(var, "expected an http(s) URL")),
    }
}
