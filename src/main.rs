// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use telegram_auth_gate::{
    api::router,
    auth::{AuthService, BotSecret},
    config::{GateConfig, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    error::StartupError,
    pages::Pages,
    state::AppState,
    telegram::TelegramClient,
    upstream::Upstream,
};
use tracing_subscriber::EnvFilter;

/// How long in-flight requests get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "gate failed");
        std::process::exit(1);
    }
}

/// Initialize tracing from RUST_LOG; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if env::var(LOG_FORMAT_ENV).is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run() -> Result<(), StartupError> {
    let config = GateConfig::from_env()?;

    // The widget needs the bot's username; resolving it also proves the token works.
    let telegram = TelegramClient::new(config.telegram_api_url.clone(), config.bot_token.clone())?;
    let bot_name = telegram.bot_username().await?;
    tracing::info!(bot = %bot_name, "resolved bot identity");

    config.allowed_users.log();

    let auth = AuthService::new(
        BotSecret::from_bot_token(&config.bot_token),
        config.allowed_users,
        config.max_auth_age,
        bot_name,
    );
    let pages = Pages::new()?;
    let upstream = Upstream::new(config.backend_url)?;
    tracing::info!(backend = %upstream.base_url(), "forwarding to backend");

    let app = router(AppState::new(auth, pages, upstream))
        .into_make_service_with_connect_info::<SocketAddr>();

    let handle = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    let addr = config.listen_addr;
    match config.tls {
        Some(tls) => {
            // Several dependencies enable rustls providers; pick ring explicitly.
            let _ = rustls::crypto::ring::default_provider().install_default();
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .map_err(|e| StartupError::Tls(format!("{}: {e}", tls.cert.display())))?;

            tracing::info!(%addr, "listening on https");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app)
                .await?;
        }
        None => {
            tracing::info!(%addr, "listening on http");
            axum_server::bind(addr).handle(handle).serve(app).await?;
        }
    }

    tracing::info!("gate shut down");
    Ok(())
}

/// Wait for SIGINT or SIGTERM, then drain connections.
async fn shutdown_on_signal(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("received shutdown signal");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
