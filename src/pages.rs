// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTML error pages.
//!
//! The 401 and 403 pages embed the Telegram login widget, which needs the
//! bot's username and the URL it should redirect the signed ticket to.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use minijinja::Environment;
use serde::Serialize;

use crate::api::LOGIN_PATH;

const TEMPLATES: [(&str, &str); 3] = [
    ("401.html", include_str!("../www/401.html")),
    ("403.html", include_str!("../www/403.html")),
    ("500.html", include_str!("../www/500.html")),
];

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Values available to every page template.
#[derive(Debug, Clone, Serialize)]
pub struct PageModel {
    /// Username of the bot, for `data-telegram-login`.
    pub bot_name: String,
    /// Where the widget sends the ticket, including the `return_url`.
    pub login_url: String,
}

impl PageModel {
    /// Model for a page shown at `return_to` (path and query).
    pub fn new(bot_name: &str, return_to: &str) -> Self {
        Self {
            bot_name: bot_name.to_string(),
            login_url: login_url(return_to),
        }
    }
}

/// `/_/login?return_url=<return_to>`.
pub fn login_url(return_to: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
    format!("{LOGIN_PATH}?return_url={encoded}")
}

/// Compiled page templates.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    /// Compile the embedded templates.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render(&self, name: &str, model: &PageModel) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(model)
    }

    /// Render `name` as a response with `status`.
    ///
    /// Falls back to the 500 page, and then to plain text, if rendering fails.
    pub fn respond(&self, status: StatusCode, name: &str, model: &PageModel) -> Response {
        match self.render(name, model) {
            Ok(body) => html(status, body),
            Err(e) => {
                tracing::error!(template = name, error = %e, "unable to render template");
                match self.render("500.html", model) {
                    Ok(body) => html(StatusCode::INTERNAL_SERVER_ERROR, body),
                    Err(e) => {
                        tracing::error!(template = "500.html", error = %e, "unable to render template");
                        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for Pages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pages").finish_non_exhaustive()
    }
}

fn html(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, HTML_CONTENT_TYPE)], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn login_url_encodes_return_path() {
        assert_eq!(login_url("/"), "/_/login?return_url=%2F");
        assert_eq!(
            login_url("/docs?page=2&q=a b"),
            "/_/login?return_url=%2Fdocs%3Fpage%3D2%26q%3Da+b"
        );
    }

    #[test]
    fn renders_widget_with_escaped_values() {
        let pages = Pages::new().unwrap();
        let model = PageModel {
            bot_name: "gate_bot".to_string(),
            login_url: "login?a=1&b=\"<".to_string(),
        };

        let body = pages.render("401.html", &model).unwrap();
        assert!(body.contains(r#"data-telegram-login="gate_bot""#));
        assert!(body.contains("login?a=1&amp;b=&quot;&lt;"));
    }

    #[tokio::test]
    async fn respond_sets_status_and_content_type() {
        let pages = Pages::new().unwrap();
        let response = pages.respond(
            StatusCode::FORBIDDEN,
            "403.html",
            &PageModel::new("gate_bot", "/"),
        );

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            HTML_CONTENT_TYPE
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8(body.to_vec()).unwrap().contains("Access denied"));
    }

    #[test]
    fn unknown_template_falls_back_to_500() {
        let pages = Pages::new().unwrap();
        let response = pages.respond(StatusCode::OK, "404.html", &PageModel::new("b", "/"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
