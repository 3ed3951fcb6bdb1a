//! Session persistence over a local-storage style key-value store.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::session::{Session, STARTING_BALANCE};

pub const USER_KEY: &str = "slotsUser";
pub const BALANCE_KEY: &str = "stars";
pub const REEL_NONCE_KEY: &str = "reelNonce";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore(BTreeMap<String, String>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.0.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.0.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.0.remove(key);
        Ok(())
    }
}

/// A JSON object of string values on disk. Every write replaces the file
/// through a sibling temp file and a rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens `path`, treating a missing file as empty.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => {
                let value: serde_json::Value = serde_json::from_str(&text)?;
                let serde_json::Value::Object(map) = value else {
                    return Err(StoreError::Corrupt(path));
                };
                let mut entries = BTreeMap::new();
                for (k, v) in map {
                    let serde_json::Value::String(v) = v else {
                        return Err(StoreError::Corrupt(path));
                    };
                    entries.insert(k, v);
                }
                entries
            }
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        debug!(path = %path.display(), keys = entries.len(), "opened store");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> StoreResult<()> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        let text = serde_json::to_string_pretty(&self.entries)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Maps a [`Session`] onto the `slotsUser` / `stars` keys.
#[derive(Debug, Clone)]
pub struct SessionStore<K> {
    kv: K,
}

impl<K: KeyValueStore> SessionStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn inner(&self) -> &K {
        &self.kv
    }

    /// `None` means nobody is logged in.
    pub fn load(&self) -> StoreResult<Option<Session>> {
        let Some(name) = self.kv.get(USER_KEY)? else {
            return Ok(None);
        };
        let balance = self.load_balance()?;
        Ok(Some(Session::with_balance(name, balance)))
    }

    /// Stored balance, or the starting balance if absent or unreadable.
    pub fn load_balance(&self) -> StoreResult<u64> {
        let Some(raw) = self.kv.get(BALANCE_KEY)? else {
            return Ok(STARTING_BALANCE);
        };
        match raw.trim().parse::<u64>() {
            Ok(balance) => Ok(balance),
            Err(e) => {
                warn!(value = %raw, error = %e, "stored balance unreadable, resetting");
                Ok(STARTING_BALANCE)
            }
        }
    }

    pub fn save(&mut self, session: &Session) -> StoreResult<()> {
        self.kv.set(BALANCE_KEY, &session.balance().to_string())
    }

    /// Next unused nonce for replayable reels; 0 if absent or unreadable.
    pub fn load_reel_position(&self) -> StoreResult<u64> {
        let Some(raw) = self.kv.get(REEL_NONCE_KEY)? else {
            return Ok(0);
        };
        match raw.trim().parse::<u64>() {
            Ok(nonce) => Ok(nonce),
            Err(e) => {
                warn!(value = %raw, error = %e, "stored reel nonce unreadable, restarting at 0");
                Ok(0)
            }
        }
    }

    pub fn save_reel_position(&mut self, nonce: u64) -> StoreResult<()> {
        self.kv.set(REEL_NONCE_KEY, &nonce.to_string())
    }

    /// Starts a fresh session. The name is stored as typed.
    pub fn login(&mut self, display_name: &str) -> StoreResult<Session> {
        let session = Session::new(display_name);
        self.kv.set(USER_KEY, display_name)?;
        self.save(&session)?;
        Ok(session)
    }

    /// Forgets the user. The balance and reel nonce keys are left behind.
    pub fn logout(&mut self) -> StoreResult<()> {
        self.kv.remove(USER_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_user_means_no_session() {
        let store = SessionStore::new(MemoryStore::new());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn login_then_load() {
        let mut store = SessionStore::new(MemoryStore::new());
        let session = store.login("ana").unwrap();
        assert_eq!(session.balance(), STARTING_BALANCE);
        assert_eq!(store.inner().get(BALANCE_KEY).unwrap().as_deref(), Some("1000"));
        assert_eq!(store.load().unwrap(), Some(session));
    }

    #[test]
    fn malformed_balance_defaults() {
        let mut kv = MemoryStore::new();
        kv.set(USER_KEY, "ana").unwrap();
        kv.set(BALANCE_KEY, "lots").unwrap();
        let store = SessionStore::new(kv.clone());
        assert_eq!(store.load().unwrap().unwrap().balance(), STARTING_BALANCE);

        kv.set(BALANCE_KEY, "-5").unwrap();
        let store = SessionStore::new(kv);
        assert_eq!(store.load_balance().unwrap(), STARTING_BALANCE);
    }

    #[test]
    fn logout_keeps_balance() {
        let mut store = SessionStore::new(MemoryStore::new());
        let mut session = store.login("ana").unwrap();
        session.credit(5);
        store.save(&session).unwrap();
        store.logout().unwrap();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.load_balance().unwrap(), 1005);
    }

    #[test]
    fn reel_position_survives_logout_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.json");
        {
            let mut store = SessionStore::new(FileStore::open(&path).unwrap());
            assert_eq!(store.load_reel_position().unwrap(), 0);
            store.login("bo").unwrap();
            store.save_reel_position(42).unwrap();
            store.logout().unwrap();
        }
        let mut store = SessionStore::new(FileStore::open(&path).unwrap());
        assert_eq!(store.load_reel_position().unwrap(), 42);
        store.login("bo").unwrap();
        assert_eq!(store.load_reel_position().unwrap(), 42);
    }

    #[test]
    fn malformed_reel_position_restarts() {
        let mut kv = MemoryStore::new();
        kv.set(REEL_NONCE_KEY, "soon").unwrap();
        let store = SessionStore::new(kv);
        assert_eq!(store.load_reel_position().unwrap(), 0);
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.json");
        {
            let mut store = SessionStore::new(FileStore::open(&path).unwrap());
            let mut session = store.login("bo").unwrap();
            session.debit_bet();
            store.save(&session).unwrap();
        }
        let store = SessionStore::new(FileStore::open(&path).unwrap());
        let session = store.load().unwrap().unwrap();
        assert_eq!(session.display_name, "bo");
        assert_eq!(session.balance(), 990);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn file_store_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Corrupt(_))));
        fs::write(&path, "{").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("absent.json")).unwrap();
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }
}
