// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Telegram Bot API client.
//!
//! Only `getMe` is needed: it validates the bot token at startup and yields
//! the bot's username, which the login widget on the error pages refers to.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("Telegram request failed: {0}")]
    Request(String),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("Telegram response was invalid: {0}")]
    InvalidResponse(String),
}

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

/// The `User` object returned by `getMe`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BotUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: String,
}

#[derive(Clone)]
pub struct TelegramClient {
    api_base_url: Url,
    bot_token: String,
    http: Client,
}

impl TelegramClient {
    pub fn new(api_base_url: Url, bot_token: impl Into<String>) -> Result<Self, TelegramError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| TelegramError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_base_url,
            bot_token: bot_token.into(),
            http,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base_url.as_str().trim_end_matches('/'),
            self.bot_token
        )
    }

    /// Fetch the bot's own user record.
    pub async fn get_me(&self) -> Result<BotUser, TelegramError> {
        let response = self
            .http
            .get(self.method_url("getMe"))
            .send()
            .await
            // The URL embeds the token; keep it out of the error.
            .map_err(|e| TelegramError::Request(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TelegramError::Request(e.without_url().to_string()))?;

        parse_response(&body).map_err(|e| match e {
            TelegramError::InvalidResponse(msg) if !status.is_success() => {
                TelegramError::Api(format!("HTTP {status}: {msg}"))
            }
            other => other,
        })
    }

    /// Username of the bot, required by the login widget.
    pub async fn bot_username(&self) -> Result<String, TelegramError> {
        let me = self.get_me().await?;
        me.username
            .filter(|name| !name.is_empty())
            .ok_or_else(|| TelegramError::InvalidResponse("bot has no username".to_string()))
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("api_base_url", &self.api_base_url.as_str())
            .finish_non_exhaustive()
    }
}

fn parse_response(body: &str) -> Result<BotUser, TelegramError> {
    let response: ApiResponse<BotUser> =
        serde_json::from_str(body).map_err(|e| TelegramError::InvalidResponse(e.to_string()))?;

    if !response.ok {
        return Err(TelegramError::Api(
            response
                .description
                .unwrap_or_else(|| "request was not ok".to_string()),
        ));
    }

    response
        .result
        .ok_or_else(|| TelegramError::InvalidResponse("missing result".to_string()))
}
