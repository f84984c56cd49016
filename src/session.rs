use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage keys, the same three the browser build kept in local storage
pub const LOGGED_IN_KEY: &str = "loggedIn";
pub const USER_TYPE_KEY: &str = "userType";
pub const USER_ID_KEY: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
    #[serde(rename = "ROLE_ACCOUNTANT")]
    Accountant,
    #[serde(rename = "ROLE_CUSTOMER")]
    Customer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Accountant, Role::Customer];

    /// The role string the API and the session store use
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ROLE_ADMIN",
            Role::Accountant => "ROLE_ACCOUNTANT",
            Role::Customer => "ROLE_CUSTOMER",
        }
    }

    /// Unknown strings are not a role
    pub fn parse(raw: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == raw.trim())
    }

    pub fn title(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Accountant => "Accountant",
            Role::Customer => "Customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the persisted login state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub logged_in: bool,
    pub role: Option<Role>,
    pub user_id: Option<String>,
}

impl Session {
    /// Role of a logged in user; `None` when logged out or the role is unknown
    pub fn active_role(&self) -> Option<Role> {
        if self.logged_in { self.role } else { None }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Session storage lock poisoned")]
    Poisoned,
}

/// String key/value storage that outlives a single run
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// JSON object on disk holding the session keys
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, SessionError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

/// In-process store, used by tests and when no file is wanted
#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let values = self.values.lock().map_err(|_| SessionError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut values = self.values.lock().map_err(|_| SessionError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut values = self.values.lock().map_err(|_| SessionError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}

/// The one place session state is read and written.
///
/// Screens get a [`Session`] snapshot from [`SessionContext::current`]; only
/// the login and logout paths call [`SessionContext::login`] and
/// [`SessionContext::logout`].
pub struct SessionContext {
    store: Box<dyn SessionStore>,
}

impl SessionContext {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemorySessionStore::default()))
    }

    pub fn current(&self) -> Result<Session, SessionError> {
        let logged_in = self.store.get(LOGGED_IN_KEY)?.as_deref() == Some("true");
        let role = self.store.get(USER_TYPE_KEY)?.as_deref().and_then(Role::parse);
        let user_id = self.store.get(USER_ID_KEY)?;

        Ok(Session {
            logged_in,
            role,
            user_id,
        })
    }

    pub fn login(&self, role: Role, user_id: &str) -> Result<Session, SessionError> {
        self.store.set(USER_TYPE_KEY, role.as_str())?;
        self.store.set(LOGGED_IN_KEY, "true")?;
        self.store.set(USER_ID_KEY, user_id)?;
        tracing::info!(role = %role, user_id, "session started");
        self.current()
    }

    /// Clears the local session only; the server is not told
    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.remove(LOGGED_IN_KEY)?;
        self.store.remove(USER_TYPE_KEY)?;
        self.store.remove(USER_ID_KEY)?;
        tracing::info!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("ROLE_SUPERUSER"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn empty_store_is_logged_out() {
        let context = SessionContext::in_memory();
        let session = context.current().unwrap();

        assert!(!session.logged_in);
        assert_eq!(session.active_role(), None);
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn login_then_logout() {
        let context = SessionContext::in_memory();

        let session = context.login(Role::Accountant, "17").unwrap();
        assert_eq!(session.active_role(), Some(Role::Accountant));
        assert_eq!(session.user_id(), Some("17"));

        context.logout().unwrap();
        assert_eq!(context.current().unwrap(), Session::default());
    }

    #[test]
    fn unknown_role_in_storage_has_no_active_role() {
        let store = MemorySessionStore::default();
        store.set(LOGGED_IN_KEY, "true").unwrap();
        store.set(USER_TYPE_KEY, "ROLE_GUEST").unwrap();
        let context = SessionContext::new(Box::new(store));

        let session = context.current().unwrap();
        assert!(session.logged_in);
        assert_eq!(session.active_role(), None);
    }

    #[test]
    fn file_store_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        SessionContext::new(Box::new(FileSessionStore::new(&path)))
            .login(Role::Customer, "42")
            .unwrap();

        let reopened = SessionContext::new(Box::new(FileSessionStore::new(&path)));
        let session = reopened.current().unwrap();
        assert_eq!(session.active_role(), Some(Role::Customer));
        assert_eq!(session.user_id(), Some("42"));

        let raw: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get(LOGGED_IN_KEY).map(String::as_str), Some("true"));
        assert_eq!(raw.get(USER_TYPE_KEY).map(String::as_str), Some("ROLE_CUSTOMER"));

        reopened.logout().unwrap();
        assert!(!reopened.current().unwrap().logged_in);
    }
}
