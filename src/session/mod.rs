//! Session persistence.
//!
//! The session is two string keys, `accessToken` and `role`, held in durable
//! key-value storage. [`SessionStore`] is the only reader and writer; it is
//! cloned into the API client and the route guard so every call and every
//! navigation sees the current values.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const ROLE_KEY: &str = "role";

/// Roles the dashboard accepts at login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    BusinessOwner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::BusinessOwner => "BusinessOwner",
        }
    }

    /// Parse the role discriminator returned by the login endpoint.
    /// Matching is exact; anything else is an unsupported role.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Admin" => Some(Role::Admin),
            "BusinessOwner" => Some(Role::BusinessOwner),
            _ => None,
        }
    }

    /// Path a freshly logged-in user of this role lands on
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::Admin => "/",
            Role::BusinessOwner => "/business-dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value storage backing the session.
///
/// Reads and writes are treated as infallible, like browser storage.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Process-local storage, used by tests and short-lived tools
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// JSON file storage so the session survives between CLI invocations.
///
/// Every operation re-reads the file; nothing is cached in memory.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return BTreeMap::new(),
        };

        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                BTreeMap::new()
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::warn!(path = %parent.display(), error = %e, "Failed to create session directory");
                    return;
                }
            }
        }

        // Written beside the target, then renamed over it
        let tmp_path = self.path.with_extension("tmp");
        let result = serde_json::to_string_pretty(entries)
            .map_err(std::io::Error::other)
            .and_then(|json| std::fs::write(&tmp_path, json))
            .and_then(|()| std::fs::rename(&tmp_path, &self.path));

        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write session file");
        }
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock();
        self.read_entries().remove(key)
    }

    fn set(&self, key: &str, value: &str) {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries();
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries);
    }

    fn remove(&self, key: &str) {
        let _guard = self.lock.lock();
        let mut entries = self.read_entries();
        if entries.remove(key).is_some() {
            self.write_entries(&entries);
        }
    }
}

/// Single source of truth for "is a user authenticated, and under which role".
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by fresh in-memory storage
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn set_session(&self, token: &str, role: &str) {
        self.storage.set(ACCESS_TOKEN_KEY, token);
        self.storage.set(ROLE_KEY, role);
        tracing::info!(role, "Session established");
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(ACCESS_TOKEN_KEY)
    }

    pub fn role(&self) -> Option<String> {
        self.storage.get(ROLE_KEY)
    }

    pub fn clear_session(&self) {
        self.storage.remove(ACCESS_TOKEN_KEY);
        self.storage.remove(ROLE_KEY);
        tracing::info!("Session cleared");
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("role", &self.role())
            .finish()
    }
}
