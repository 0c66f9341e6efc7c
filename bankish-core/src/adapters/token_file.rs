//! Token store adapters
//!
//! `FileTokenStore` keeps the bearer token in `session.json` inside the
//! Bankish directory, under the fixed `bankToken` key:
//! ```json
//! { "bankToken": "<token>" }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value as JsonValue};
use tempfile::NamedTempFile;

use crate::domain::result::{Error, Result};
use crate::ports::{TokenStore, TOKEN_KEY};

const SESSION_FILE: &str = "session.json";

/// Token store backed by a small JSON file
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(bankish_dir: &Path) -> Self {
        Self {
            path: bankish_dir.join(SESSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<Map<String, JsonValue>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        // A corrupt file is treated like an empty one
        Ok(serde_json::from_str::<Map<String, JsonValue>>(&content).unwrap_or_default())
    }

    fn write_map(&self, map: &Map<String, JsonValue>) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::config("session file has no parent directory"))?;
        std::fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(serde_json::to_string_pretty(map)?.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let map = self.read_map()?;
        Ok(map
            .get(TOKEN_KEY)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string))
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut map = self.read_map()?;
        map.insert(TOKEN_KEY.to_string(), JsonValue::String(token.to_string()));
        self.write_map(&map)
    }

    fn clear(&self) -> Result<()> {
        let mut map = self.read_map()?;
        if map.remove(TOKEN_KEY).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// In-memory token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>> {
        let guard = self
            .token
            .lock()
            .map_err(|e| Error::Other(format!("Lock poisoned: {}", e)))?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| Error::Other(format!("Lock poisoned: {}", e)))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| Error::Other(format!("Lock poisoned: {}", e)))?;
        *guard = None;
        Ok(())
    }
}
