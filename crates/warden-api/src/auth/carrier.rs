// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Transport of ticket tokens between client and server.

use async_trait::async_trait;
use axum::http::{Extensions, HeaderMap};

use crate::error::ApiResult;

/// Where the ticket layer finds the presented token and where it puts a new
/// one.
///
/// [`TicketCookie`](crate::auth::TicketCookie) keeps the token in a cookie of
/// its own. [`SessionTicket`](crate::auth::SessionTicket) keeps it in a field
/// of a server-side session managed outside this crate.
#[async_trait]
pub trait TicketCarrier: Send + Sync + 'static {
    /// State captured while reading the request and reused on the response.
    type Slot: Send + Sync + 'static;

    /// Returns the presented token, if any.
    ///
    /// An error aborts the request with that error's response.
    async fn read_token(
        &self,
        headers: &HeaderMap,
        extensions: &Extensions,
    ) -> ApiResult<(Option<String>, Self::Slot)>;

    /// Hands `token` to the client, valid for `max_age` seconds.
    async fn store_token(&self, slot: &Self::Slot, headers: &mut HeaderMap, token: &str, max_age: u64);

    /// Withdraws the token from the client.
    async fn clear_token(&self, slot: &Self::Slot, headers: &mut HeaderMap);
}
