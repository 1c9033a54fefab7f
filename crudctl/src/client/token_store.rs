//! Persistence for the client's access token.
//!
//! The token lives under the fixed key [`TOKEN_KEY`] of a small key/value store, so that it
//! survives restarts the way browser local storage would.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::debug;

use crate::client::Result;

/// Key the access token is stored under
pub const TOKEN_KEY: &str = "token";

pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<String>>;
    fn set(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Key/value JSON file. Keys other than [`TOKEN_KEY`] are preserved.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(entries)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.read()?.remove(TOKEN_KEY))
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut entries = self.read()?;
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write(&entries)?;
        debug!("Stored access token in {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.read()?;
        if entries.remove(TOKEN_KEY).is_some() {
            self.write(&entries)?;
            debug!("Cleared access token from {}", self.path.display());
        }
        Ok(())
    }
}

/// Process-local store, for tests and short-lived sessions
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone())
    }

    fn set(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        Ok(())
    }
}
