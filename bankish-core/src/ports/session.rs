//! Session token port

use std::fmt;

use crate::domain::result::{Error, Result};

/// Key the bearer token is stored under
pub const TOKEN_KEY: &str = "bankToken";

/// Persistent storage for the bearer token
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>>;

    fn save(&self, token: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Bearer credentials passed into every authenticated call
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::session("token cannot be empty"));
        }
        Ok(Self { token })
    }

    /// Read credentials from a token store; absent or empty tokens are an error
    pub fn from_store(store: &dyn TokenStore) -> Result<Self> {
        match store.load()? {
            Some(token) if !token.trim().is_empty() => Ok(Self { token }),
            _ => Err(Error::session("not logged in. Run 'bk login' first.")),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

// Never print the token itself
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("token", &"<redacted>").finish()
    }
}
