// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-request remember / forget handle.

use std::sync::Arc;

use parking_lot::Mutex;

/// A pending change to the ticket cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Issue a ticket for this identity.
    Remember(String),
    /// Clear the ticket cookie.
    Forget,
}

/// Handle that lets a handler remember or forget the caller.
///
/// The ticket layer inserts one into the request extensions and applies the
/// last recorded action to the response. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    action: Arc<Mutex<Option<SessionAction>>>,
}

impl AuthSession {
    /// Creates an empty session handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a fresh ticket for `identity` on the response.
    pub fn remember(&self, identity: impl Into<String>) {
        *self.action.lock() = Some(SessionAction::Remember(identity.into()));
    }

    /// Schedules removal of the ticket cookie.
    pub fn forget(&self) {
        *self.action.lock() = Some(SessionAction::Forget);
    }

    /// Returns the pending action without consuming it.
    pub fn pending(&self) -> Option<SessionAction> {
        self.action.lock().clone()
    }

    /// Consumes the pending action.
    pub fn take(&self) -> Option<SessionAction> {
        self.action.lock().take()
    }
}
