// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::config::ConfigError;
use crate::telegram::TelegramError;

/// Fatal errors while starting the gate.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("unable to reach Telegram: {0}")]
    Telegram(#[from] TelegramError),

    #[error("unable to load page templates: {0}")]
    Templates(#[from] minijinja::Error),

    #[error("unable to set up upstream client: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure forwarding a request to the backend.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("backend request failed: {0}")]
    Request(String),
}

impl UpstreamError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UpstreamError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
            UpstreamError::Request(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "upstream forwarding failed");
        let status = self.status_code();
        let reason = status.canonical_reason().unwrap_or("Error");
        (status, reason).into_response()
    }
}
