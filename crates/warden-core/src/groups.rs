// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Effective group resolution.
//!
//! The group lookup is external and may be slow; [`GroupSource`] is its
//! boundary. Its raw answer is turned into the set of principals a request
//! holds by [`resolve_groups`].

use std::collections::hash_set;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::acl::Principal;

// =============================================================================
// EffectiveGroups
// =============================================================================

/// Principals held by one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveGroups(HashSet<Principal>);

impl EffectiveGroups {
    /// Returns `true` if `principal` is held.
    pub fn contains(&self, principal: &Principal) -> bool {
        self.0.contains(principal)
    }

    /// Returns `true` if the named group is held.
    pub fn contains_group(&self, name: &str) -> bool {
        self.0.contains(&Principal::group(name))
    }

    /// Iterates over the held principals in no particular order.
    pub fn iter(&self) -> hash_set::Iter<'_, Principal> {
        self.0.iter()
    }

    /// Number of held principals.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Principal> for EffectiveGroups {
    fn from_iter<I: IntoIterator<Item = Principal>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EffectiveGroups {
    type Item = &'a Principal;
    type IntoIter = hash_set::Iter<'a, Principal>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Expands a raw group lookup result into the effective group set.
///
/// `None` from the lookup stays `None`: the caller is explicitly forbidden and
/// every check denies. Otherwise the raw groups gain [`Principal::Everyone`]
/// and, for an authenticated identity, [`Principal::AuthenticatedUser`] and
/// [`Principal::Identity`].
pub fn resolve_groups<I, S>(identity: Option<&str>, raw_groups: Option<I>) -> Option<EffectiveGroups>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let raw_groups = raw_groups?;

    let mut groups: HashSet<Principal> = raw_groups
        .into_iter()
        .map(|name| Principal::Group(name.into()))
        .collect();
    groups.insert(Principal::Everyone);

    if let Some(identity) = identity {
        groups.insert(Principal::AuthenticatedUser);
        groups.insert(Principal::identity(identity));
    }

    Some(EffectiveGroups(groups))
}

// =============================================================================
// GroupSource
// =============================================================================

/// External group-membership lookup.
///
/// `None` means "explicitly no access"; an empty list means "no extra groups".
#[async_trait]
pub trait GroupSource: Send + Sync {
    /// Returns the raw groups of `identity` (`None` for anonymous requests).
    async fn groups(&self, identity: Option<&str>) -> Option<Vec<String>>;
}

#[async_trait]
impl<T: GroupSource + ?Sized> GroupSource for Arc<T> {
    async fn groups(&self, identity: Option<&str>) -> Option<Vec<String>> {
        (**self).groups(identity).await
    }
}

/// Fixed group assignments.
#[derive(Debug, Clone, Default)]
pub struct StaticGroups {
    defaults: Vec<String>,
    per_identity: HashMap<String, Vec<String>>,
    forbidden: HashSet<String>,
    forbid_all: bool,
}

impl StaticGroups {
    /// Every caller gets `defaults`.
    pub fn new<I, S>(defaults: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            defaults: defaults.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// A source that forbids every caller.
    pub fn none() -> Self {
        Self {
            forbid_all: true,
            ..Default::default()
        }
    }

    /// Adds groups for a specific identity, on top of the defaults.
    pub fn with_identity<I, S>(mut self, identity: impl Into<String>, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.per_identity
            .entry(identity.into())
            .or_default()
            .extend(groups.into_iter().map(Into::into));
        self
    }

    /// Explicitly forbids an identity.
    pub fn with_forbidden(mut self, identity: impl Into<String>) -> Self {
        self.forbidden.insert(identity.into());
        self
    }

    fn lookup(&self, identity: Option<&str>) -> Option<Vec<String>> {
        if self.forbid_all {
            return None;
        }
        let mut groups = self.defaults.clone();
        if let Some(identity) = identity {
            if self.forbidden.contains(identity) {
                return None;
            }
            if let Some(extra) = self.per_identity.get(identity) {
                groups.extend(extra.iter().cloned());
            }
        }
        Some(groups)
    }
}

#[async_trait]
impl GroupSource for StaticGroups {
    async fn groups(&self, identity: Option<&str>) -> Option<Vec<String>> {
        self.lookup(identity)
    }
}

/// Adapts an async closure into a [`GroupSource`].
///
/// ```
/// use warden_core::groups::GroupFn;
///
/// let source = GroupFn::new(|identity: Option<String>| async move {
///     identity.map(|_| vec!["staff".to_string()])
/// });
/// # let _ = source;
/// ```
#[derive(Clone)]
pub struct GroupFn<F>(F);

impl<F> GroupFn<F> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> std::fmt::Debug for GroupFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GroupFn")
    }
}

#[async_trait]
impl<F, Fut> GroupSource for GroupFn<F>
where
    F: Fn(Option<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Vec<String>>> + Send + 'static,
{
    async fn groups(&self, identity: Option<&str>) -> Option<Vec<String>> {
        (self.0)(identity.map(str::to_owned)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_none_propagates() {
        assert!(resolve_groups(Some("alice"), None::<Vec<String>>).is_none());
        assert!(resolve_groups(None, None::<Vec<String>>).is_none());
    }

    #[test]
    fn test_resolve_anonymous() {
        let groups = resolve_groups(None, Some(vec!["g1"])).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups.contains(&Principal::Everyone));
        assert!(groups.contains_group("g1"));
        assert!(!groups.contains(&Principal::AuthenticatedUser));
    }

    #[test]
    fn test_resolve_authenticated() {
        let groups = resolve_groups(Some("alice"), Some(Vec::<String>::new())).unwrap();
        assert_eq!(groups.len(), 3);
        assert!(groups.contains(&Principal::Everyone));
        assert!(groups.contains(&Principal::AuthenticatedUser));
        assert!(groups.contains(&Principal::identity("alice")));
        assert!(!groups.contains_group("alice"));
    }

    #[test]
    fn test_resolve_reserved_names_stay_groups() {
        let groups = resolve_groups(None, Some(vec!["everyone"])).unwrap();
        assert!(groups.contains_group("everyone"));
        assert!(groups.contains(&Principal::Everyone));
        assert_eq!(groups.len(), 2);
    }

    #[tokio::test]
    async fn test_static_groups() {
        let source = StaticGroups::new(["staff"])
            .with_identity("alice", ["admins"])
            .with_forbidden("mallory");

        assert_eq!(source.groups(None).await, Some(vec!["staff".to_string()]));
        assert_eq!(
            source.groups(Some("alice")).await,
            Some(vec!["staff".to_string(), "admins".to_string()])
        );
        assert_eq!(source.groups(Some("mallory")).await, None);
        assert_eq!(StaticGroups::none().groups(Some("alice")).await, None);
    }

    #[tokio::test]
    async fn test_group_fn_and_arc() {
        let source = Arc::new(GroupFn::new(|identity: Option<String>| async move {
            identity.map(|id| vec![format!("{}-team", id)])
        }));

        assert_eq!(
            source.groups(Some("bob")).await,
            Some(vec!["bob-team".to_string()])
        );
        assert_eq!(source.groups(None).await, None);

        let shared: Arc<dyn GroupSource> = source;
        assert!(shared.groups(Some("bob")).await.is_some());
    }
}
