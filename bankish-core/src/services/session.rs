//! Session handling on top of a token store
//!
//! There is no login protocol here: a token obtained elsewhere is stored,
//! and `GET /auth/me` tells whether it is still good. A rejected or
//! unreachable profile lookup clears the stored token.

use std::sync::Arc;

use super::logging::{note, ClientEvent, LogEvent, LoggingService};
use crate::domain::result::{Error, Result};
use crate::domain::UserProfile;
use crate::ports::{BankingApi, Credentials, TokenStore};

pub struct SessionService {
    api: Arc<dyn BankingApi>,
    store: Arc<dyn TokenStore>,
    logger: Option<Arc<LoggingService>>,
}

impl SessionService {
    pub fn new(api: Arc<dyn BankingApi>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            store,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// A non-empty token is stored
    pub fn has_session(&self) -> bool {
        matches!(self.store.load(), Ok(Some(token)) if !token.trim().is_empty())
    }

    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::from_store(self.store.as_ref())
    }

    pub fn login(&self, token: &str) -> Result<()> {
        let credentials = Credentials::bearer(token.trim())?;
        self.store.save(credentials.token())
    }

    pub fn logout(&self) -> Result<()> {
        self.store.clear()
    }

    /// Profile for the stored token; any failure ends the session
    pub fn current_user(&self) -> Result<UserProfile> {
        let credentials = self.credentials()?;
        match self.api.get_profile(&credentials) {
            Ok(profile) => Ok(profile),
            Err(e) => {
                note(self.logger.as_deref(), LogEvent::new(ClientEvent::ProfileUnavailable).failed_with(&e));
                self.store.clear()?;
                Err(match e {
                    Error::Unauthorized => Error::session("session expired. Run 'bk login' again."),
                    other => other,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http_api::BankishClient;
    use crate::adapters::mock_backend::{MockBackend, MockConfig};
    use crate::adapters::token_file::MemoryTokenStore;

    fn service(server: &MockBackend, store: Arc<MemoryTokenStore>) -> SessionService {
        SessionService::new(Arc::new(BankishClient::new(&server.base_url()).unwrap()), store)
    }

    #[test]
    fn test_login_logout() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let store = Arc::new(MemoryTokenStore::new());
        let session = service(&server, store.clone());

        assert!(!session.has_session());
        assert!(session.login("   ").is_err());
        session.login(" valid_abc ").unwrap();
        assert!(session.has_session());
        assert_eq!(store.load().unwrap().as_deref(), Some("valid_abc"));

        session.logout().unwrap();
        assert!(!session.has_session());
        assert!(matches!(session.credentials(), Err(Error::Session(_))));
    }

    #[test]
    fn test_current_user_keeps_good_token() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let store = Arc::new(MemoryTokenStore::with_token("valid_abc"));
        let session = service(&server, store);

        assert_eq!(session.current_user().unwrap().email, "ada@example.com");
        assert!(session.has_session());
    }

    #[test]
    fn test_rejected_token_is_cleared() {
        let server = MockBackend::start(MockConfig::default()).unwrap();
        let store = Arc::new(MemoryTokenStore::with_token("stale"));
        let session = service(&server, store);

        let err = session.current_user().unwrap_err();
        assert!(matches!(err, Error::Session(_)));
        assert!(!session.has_session());
    }
}
