// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Pluggable authorization policies.
//!
//! An [`AutzPolicy`] answers whether an identity holds a permission. The
//! stock [`AclAutzPolicy`] resolves groups through a [`GroupSource`] and
//! evaluates an [`AclContext`]; anything else is a custom implementation.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::acl::AclContext;
use crate::error::{AutzError, AutzResult};
use crate::groups::{resolve_groups, GroupSource};

/// Authorization strategy consulted per request.
#[async_trait]
pub trait AutzPolicy: Send + Sync {
    /// Decides whether `identity` holds `permission`.
    ///
    /// `context` is a request-local rule set; policies that use ACLs prefer it
    /// over their own. Denial is `Ok(false)`; `Err` signals misconfiguration.
    async fn permit(
        &self,
        identity: Option<&str>,
        permission: &str,
        context: Option<&dyn AclContext>,
    ) -> AutzResult<bool>;
}

#[async_trait]
impl<T: AutzPolicy + ?Sized> AutzPolicy for Arc<T> {
    async fn permit(
        &self,
        identity: Option<&str>,
        permission: &str,
        context: Option<&dyn AclContext>,
    ) -> AutzResult<bool> {
        (**self).permit(identity, permission, context).await
    }
}

// =============================================================================
// AclAutzPolicy
// =============================================================================

/// ACL-backed authorization.
pub struct AclAutzPolicy<G> {
    groups: G,
    context: Option<Arc<dyn AclContext>>,
}

impl<G: GroupSource> AclAutzPolicy<G> {
    /// Creates a policy with no global context.
    pub fn new(groups: G) -> Self {
        Self {
            groups,
            context: None,
        }
    }

    /// Sets the global context used when a check supplies none.
    pub fn with_context(mut self, context: Arc<dyn AclContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the global context.
    pub fn context(&self) -> Option<&Arc<dyn AclContext>> {
        self.context.as_ref()
    }

    /// Returns the group source.
    pub fn group_source(&self) -> &G {
        &self.groups
    }
}

#[async_trait]
impl<G: GroupSource> AutzPolicy for AclAutzPolicy<G> {
    async fn permit(
        &self,
        identity: Option<&str>,
        permission: &str,
        context: Option<&dyn AclContext>,
    ) -> AutzResult<bool> {
        let context: &dyn AclContext = match (context, self.context.as_deref()) {
            (Some(local), _) => local,
            (None, Some(global)) => global,
            (None, None) => return Err(AutzError::MissingContext),
        };

        let raw = self.groups.groups(identity).await;
        let groups = resolve_groups(identity, raw);
        let allowed = context.permit(identity, groups.as_ref(), permission);

        tracing::debug!(
            identity = identity.unwrap_or("-"),
            permission,
            forbidden = groups.is_none(),
            allowed,
            "ACL permission check"
        );

        Ok(allowed)
    }
}

impl<G: fmt::Debug> fmt::Debug for AclAutzPolicy<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AclAutzPolicy")
            .field("groups", &self.groups)
            .field("context", &self.context)
            .finish()
    }
}
