//! Role storage trait and implementations.

use super::Role;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Errors that can occur in role store lookups.
#[derive(Debug, thiserror::Error)]
pub enum RoleStoreError {
    /// The store could not answer right now; a retry may succeed.
    #[error("role store temporarily unavailable: {0}")]
    Transient(String),

    /// The store answered with an error.
    #[error("role store error: {0}")]
    Backend(String),

    /// IO error reading role definitions.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Role definitions could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RoleStoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RoleStoreError::Transient(_))
    }
}

/// Point lookups of roles by name.
///
/// A missing role is `Ok(None)`, not an error.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<Option<Role>, RoleStoreError>;
}

/// In-memory role store.
#[derive(Default)]
pub struct MemoryRoleStore {
    roles: RwLock<HashMap<String, Role>>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role while building the store.
    pub fn with_role<I, S>(self, name: &str, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(Role::new(name, permissions));
        self
    }

    /// Add or replace a role.
    pub fn insert(&self, role: Role) {
        self.roles.write().insert(role.name.clone(), role);
    }

    /// Remove a role. Returns `true` if it existed.
    pub fn remove(&self, name: &str) -> bool {
        self.roles.write().remove(name).is_some()
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn fetch(&self, name: &str) -> Result<Option<Role>, RoleStoreError> {
        Ok(self.roles.read().get(name).cloned())
    }
}

/// Accepted shapes of a role file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RoleDocument {
    /// `{"reader": ["customer:read"]}`
    Map(HashMap<String, Vec<String>>),
    /// `[{"role_name": "reader", "permissions": ["customer:read"]}]`
    List(Vec<Role>),
}

impl RoleDocument {
    fn into_roles(self) -> HashMap<String, Role> {
        match self {
            RoleDocument::Map(map) => map
                .into_iter()
                .map(|(name, permissions)| (name.clone(), Role::new(name, permissions)))
                .collect(),
            RoleDocument::List(list) => list
                .into_iter()
                .map(|role| (role.name.clone(), role))
                .collect(),
        }
    }
}

/// Role definitions read from a JSON file.
///
/// The file is read on first lookup and kept in memory until
/// [`reload`](Self::reload). A file that does not exist defines no roles.
pub struct FileRoleStore {
    path: PathBuf,
    cache: RwLock<Option<HashMap<String, Role>>>,
}

impl FileRoleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Drop the in-memory copy and read the file again.
    pub fn reload(&self) -> Result<(), RoleStoreError> {
        let roles = self.read_file()?;
        *self.cache.write() = Some(roles);
        Ok(())
    }

    fn ensure_loaded(&self) -> Result<(), RoleStoreError> {
        if self.cache.read().is_some() {
            return Ok(());
        }

        let roles = self.read_file()?;
        let mut cache = self.cache.write();
        if cache.is_none() {
            *cache = Some(roles);
        }
        Ok(())
    }

    fn read_file(&self) -> Result<HashMap<String, Role>, RoleStoreError> {
        if !self.path.exists() {
            log::warn!("role file {} does not exist", self.path.display());
            return Ok(HashMap::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(HashMap::new());
        }

        let document: RoleDocument = serde_json::from_str(&contents)?;
        Ok(document.into_roles())
    }
}

#[async_trait]
impl RoleStore for FileRoleStore {
    async fn fetch(&self, name: &str) -> Result<Option<Role>, RoleStoreError> {
        self.ensure_loaded()?;
        Ok(self
            .cache
            .read()
            .as_ref()
            .and_then(|roles| roles.get(name).cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_store_fetch() {
        let store = MemoryRoleStore::new().with_role("reader", ["customer:read"]);

        let role = store.fetch("reader").await.unwrap().unwrap();
        assert_eq!(role.permissions, vec!["customer:read"]);
        assert!(store.fetch("writer").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_insert_and_remove() {
        let store = MemoryRoleStore::new();
        store.insert(Role::new("admin", ["*"]));
        assert!(store.fetch("admin").await.unwrap().is_some());

        assert!(store.remove("admin"));
        assert!(!store.remove("admin"));
        assert!(store.fetch("admin").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_map_form() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(
            &path,
            r#"{"reader": ["customer:read"], "admin": ["*"]}"#,
        )
        .unwrap();

        let store = FileRoleStore::new(&path);
        let admin = store.fetch("admin").await.unwrap().unwrap();
        assert_eq!(admin, Role::new("admin", ["*"]));
        assert!(store.fetch("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_list_form() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(
            &path,
            r#"[{"role_name": "writer", "permissions": ["customer:read", "customer:write"]}]"#,
        )
        .unwrap();

        let store = FileRoleStore::new(&path);
        let writer = store.fetch("writer").await.unwrap().unwrap();
        assert_eq!(writer.permissions.len(), 2);
    }

    #[tokio::test]
    async fn test_file_store_missing_file_has_no_roles() {
        let dir = TempDir::new().unwrap();
        let store = FileRoleStore::new(dir.path().join("absent.json"));
        assert!(store.fetch("reader").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileRoleStore::new(&path);
        let err = store.fetch("reader").await.unwrap_err();
        assert!(matches!(err, RoleStoreError::Json(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_file_store_reload_picks_up_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(&path, r#"{"reader": ["customer:read"]}"#).unwrap();

        let store = FileRoleStore::new(&path);
        assert!(store.fetch("writer").await.unwrap().is_none());

        std::fs::write(&path, r#"{"writer": ["customer:write"]}"#).unwrap();
        // still served from memory
        assert!(store.fetch("writer").await.unwrap().is_none());

        store.reload().unwrap();
        assert!(store.fetch("writer").await.unwrap().is_some());
        assert!(store.fetch("reader").await.unwrap().is_none());
    }
}
