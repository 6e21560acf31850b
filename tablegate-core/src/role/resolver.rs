use super::store::{RoleStore, RoleStoreError};
use super::Role;
use crate::permission::PermissionSet;
use dashmap::DashMap;
use futures::future::try_join_all;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A role lookup failed, so no set was produced.
///
/// Callers must treat this like a denial with its own reason, never as an
/// empty or partial set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolutionError {
    #[error("role '{role}' could not be resolved right now: {reason}")]
    Transient { role: String, reason: String },

    #[error("role '{role}' could not be resolved: {reason}")]
    Unknown { role: String, reason: String },
}

impl ResolutionError {
    fn from_store(role: &str, err: RoleStoreError) -> Self {
        let reason = err.to_string();
        let role = role.to_string();
        if err.is_transient() {
            ResolutionError::Transient { role, reason }
        } else {
            ResolutionError::Unknown { role, reason }
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ResolutionError::Transient { .. })
    }
}

struct CachedRole {
    role: Option<Role>,
    fetched_at: Instant,
}

/// Read-through role cache with a fixed time to live.
struct RoleCache {
    ttl: Duration,
    entries: DashMap<String, CachedRole>,
}

impl RoleCache {
    fn get(&self, name: &str) -> Option<Option<Role>> {
        let entry = self.entries.get(name)?;
        (entry.fetched_at.elapsed() < self.ttl).then(|| entry.role.clone())
    }

    fn insert(&self, name: &str, role: Option<Role>) {
        self.entries.insert(
            name.to_string(),
            CachedRole {
                role,
                fetched_at: Instant::now(),
            },
        );
    }
}

/// Resolves role names into the union of their permissions.
///
/// Each distinct role is looked up once, all lookups run concurrently. A
/// role the store does not know contributes nothing. If any lookup fails
/// the whole resolution fails.
pub struct PermissionResolver {
    store: Arc<dyn RoleStore>,
    cache: Option<RoleCache>,
}

impl PermissionResolver {
    /// Resolver without caching. Every call hits the store.
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store, cache: None }
    }

    /// Cache lookups for `ttl`. Failed lookups are never cached.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = Some(RoleCache {
            ttl,
            entries: DashMap::new(),
        });
        self
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache.as_ref().map(|cache| cache.ttl)
    }

    /// Resolve the permission set for `role_names`.
    pub async fn resolve<I, S>(&self, role_names: I) -> Result<PermissionSet, ResolutionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: BTreeSet<String> = role_names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();

        let roles = try_join_all(names.iter().map(|name| self.lookup(name))).await?;

        Ok(PermissionSet::union(
            roles.iter().flatten().map(Role::permission_set),
        ))
    }

    /// Forget the cached entry for one role.
    pub fn invalidate(&self, name: &str) {
        if let Some(cache) = &self.cache {
            cache.entries.remove(name);
        }
    }

    /// Forget every cached entry.
    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.entries.clear();
        }
    }

    async fn lookup(&self, name: &str) -> Result<Option<Role>, ResolutionError> {
        if let Some(role) = self.cache.as_ref().and_then(|cache| cache.get(name)) {
            return Ok(role);
        }

        let role = self.store.fetch(name).await.map_err(|err| {
            log::warn!("role lookup for '{}' failed: {}", name, err);
            ResolutionError::from_store(name, err)
        })?;

        if role.is_none() {
            log::debug!("role '{}' not found, contributes no permissions", name);
        }
        if let Some(cache) = &self.cache {
            cache.insert(name, role.clone());
        }
        Ok(role)
    }
}
