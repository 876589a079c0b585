// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AuthService;
use crate::pages::Pages;
use crate::upstream::Upstream;

/// Shared handler state. Everything in it is read-only after startup, so
/// handlers share it through `Arc`s without locking.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub pages: Arc<Pages>,
    pub upstream: Arc<Upstream>,
}

impl AppState {
    pub fn new(auth: AuthService, pages: Pages, upstream: Upstream) -> Self {
        Self {
            auth: Arc::new(auth),
            pages: Arc::new(pages),
            upstream: Arc::new(upstream),
        }
    }
}
