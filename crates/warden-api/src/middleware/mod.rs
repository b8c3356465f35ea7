// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Middleware implementations.
//!
//! Layers are meant to be stacked with the ticket layer outermost:
//!
//! - [`TicketAuthLayer`]: ticket authentication through a carrier, remember / forget, reissue
//! - [`AuthRequiredLayer`]: rejects anonymous requests
//! - [`AclLayer`]: permission check before the handler runs

mod acl;
mod auth;
mod required;

pub use acl::{AclLayer, AclMiddleware};
pub use auth::{TicketAuthLayer, TicketAuthMiddleware};
pub use required::{AuthRequiredLayer, AuthRequiredMiddleware};
