// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # warden-api
//!
//! axum / tower adapters for warden.
//!
//! The core crate answers "who is this?" and "may they?"; this crate wires
//! those answers into a request pipeline:
//!
//! - [`middleware::TicketAuthLayer`] reads the ticket through an
//!   [`auth::TicketCarrier`] (a cookie by default, or a session field),
//!   attaches an [`auth::AuthContext`] and an [`auth::AuthSession`], and
//!   writes the new ticket back for remember, forget and reissue
//! - [`middleware::AclLayer`] checks one permission before the handler runs
//! - [`middleware::AuthRequiredLayer`] rejects anonymous requests
//! - [`extractors`] give handlers typed access to the same state
//!
//! ```rust,ignore
//! let config = warden_config::load_config("warden.yaml")?;
//! let autz: Arc<dyn AutzPolicy> = Arc::new(config.autz_policy());
//!
//! let app = Router::new()
//!     .route("/edit", post(edit).layer(AclLayer::require("edit", autz.clone())))
//!     .route("/login", post(login))
//!     .layer(TicketAuthLayer::from_config(&config)?);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod auth;
pub mod error;
pub mod extractors;
pub mod middleware;

pub use auth::{AuthContext, AuthSession, SessionAction, SessionTicket, TicketCarrier, TicketCookie};
pub use error::{ApiError, ApiResult, ErrorDetails, ErrorResponseBody};
pub use extractors::{Auth, OptionalAuth, Session};
pub use middleware::{AclLayer, AuthRequiredLayer, TicketAuthLayer};
