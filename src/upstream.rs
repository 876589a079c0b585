// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reverse-proxy forwarding to the protected backend.
//!
//! Requests are streamed through unchanged apart from hop-by-hop headers.
//! Redirects from the backend are passed back to the client, not followed.

use std::{net::IpAddr, time::Duration};

use axum::{
    body::{Body, HttpBody},
    extract::Request,
    http::{header, HeaderMap, HeaderName, HeaderValue, Uri},
    response::Response,
};
use reqwest::Client;
use url::Url;

use crate::error::UpstreamError;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
];

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Client for the backend behind the gate.
#[derive(Debug, Clone)]
pub struct Upstream {
    base_url: Url,
    http: Client,
}

impl Upstream {
    pub fn new(base_url: Url) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| UpstreamError::Client(e.to_string()))?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Backend URL for an incoming request URI.
    ///
    /// The request path is appended to the backend path with exactly one `/`
    /// between them; query strings from both are kept.
    pub fn target_url(&self, uri: &Uri) -> Url {
        let mut target = self.base_url.clone();

        let base_path = self.base_url.path();
        let path = uri.path();
        let joined = match (base_path.ends_with('/'), path.starts_with('/')) {
            (true, true) => format!("{base_path}{}", &path[1..]),
            (false, false) => format!("{base_path}/{path}"),
            _ => format!("{base_path}{path}"),
        };
        target.set_path(&joined);

        let query = match (self.base_url.query(), uri.query()) {
            (Some(base), Some(req)) if !base.is_empty() && !req.is_empty() => {
                Some(format!("{base}&{req}"))
            }
            (Some(base), _) if !base.is_empty() => Some(base.to_string()),
            (_, Some(req)) if !req.is_empty() => Some(req.to_string()),
            _ => None,
        };
        target.set_query(query.as_deref());

        target
    }

    /// Forward `request` and stream the backend's response back.
    pub async fn forward(
        &self,
        request: Request,
        client_ip: Option<IpAddr>,
    ) -> Result<Response, UpstreamError> {
        let (parts, body) = request.into_parts();
        let target = self.target_url(&parts.uri);

        let mut headers = parts.headers;
        // The backend sees the host the client asked for.
        let inbound_host = headers
            .get(header::HOST)
            .cloned()
            .or_else(|| {
                parts
                    .uri
                    .authority()
                    .and_then(|a| HeaderValue::from_str(a.as_str()).ok())
            });
        strip_hop_by_hop(&mut headers);
        if let Some(ip) = client_ip {
            append_forwarded_for(&mut headers, ip);
        }
        if let Some(host) = inbound_host {
            headers.insert(header::HOST, host.clone());
            headers.insert(X_FORWARDED_HOST, host);
        }

        let mut builder = self.http.request(parts.method, target).headers(headers);
        if body.size_hint().exact() != Some(0) {
            builder = builder.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream = builder
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let status = upstream.status();
        let mut response_headers = upstream.headers().clone();
        strip_hop_by_hop(&mut response_headers);

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}

/// Drop hop-by-hop headers, including any listed in `Connection`.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
    // Upgrade is only meaningful together with Connection: upgrade.
    headers.remove(header::UPGRADE);
}

fn append_forwarded_for(headers: &mut HeaderMap, ip: IpAddr) {
    let prior: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    let value = if prior.is_empty() {
        ip.to_string()
    } else {
        format!("{}, {ip}", prior.join(", "))
    };
    if let Ok(value) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, value);
    }
}
