// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request-scoped authentication state.
//!
//! - [`AuthContext`]: who is calling, attached to every request
//! - [`AuthSession`]: remember / forget handle for handlers
//! - [`TicketCarrier`]: how tickets travel between client and server
//! - [`TicketCookie`]: tickets in a cookie of their own
//! - [`SessionTicket`]: tickets in a server-side session field

mod carrier;
mod context;
mod cookie;
mod session;
mod session_ticket;

pub use carrier::TicketCarrier;
pub use context::AuthContext;
pub use cookie::TicketCookie;
pub use session::{AuthSession, SessionAction};
pub use session_ticket::SessionTicket;
