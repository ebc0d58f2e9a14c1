//! Client Session
//!
//! Where a dashboard keeps its bearer token between calls and runs.
//!
//! - **store**: The [`TokenStore`] trait and its cookie-file / memory backends
//! - **watcher**: [`AuthWatcher`], a background poller publishing [`AuthStatus`]
//!
//! [`Session`] combines a persistent cookie store with a process-lifetime
//! session store. The cookie is the source of truth; a token found only in
//! the session store is copied into the cookie the first time it is read.

pub mod store;
pub mod watcher;

pub use store::{CookieFileStore, MemoryStore, TokenStore};
pub use watcher::AuthWatcher;

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Key holding the bearer token
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Key holding the last backend URL that answered
pub const API_BASE_URL_KEY: &str = "api_base_url";

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file {path:?}: {error}")]
    Corrupt { path: PathBuf, error: String },
}

/// Authentication state as seen by the dashboards
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    Anonymous,
    Authenticated { token: String },
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthStatus::Authenticated { .. })
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            AuthStatus::Authenticated { token } => Some(token),
            AuthStatus::Anonymous => None,
        }
    }
}

/// Hybrid cookie + session token storage
#[derive(Clone)]
pub struct Session {
    cookie: Arc<dyn TokenStore>,
    session: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(cookie: Arc<dyn TokenStore>, session: Arc<dyn TokenStore>) -> Self {
        Self { cookie, session }
    }

    /// Cookie persisted at `path`, session store in memory
    pub fn with_cookie_file(path: impl Into<PathBuf>) -> Self {
        Self::new(
            Arc::new(CookieFileStore::new(path)),
            Arc::new(MemoryStore::new()),
        )
    }

    /// Both stores in memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// Current bearer token.
    ///
    /// Reads the cookie first. A token present only in the session store is
    /// migrated into the cookie and returned; a failed migration is logged
    /// and the token is still returned.
    pub fn token(&self) -> Result<Option<String>, SessionError> {
        if let Some(token) = self.cookie.get(AUTH_TOKEN_KEY)? {
            return Ok(Some(token));
        }

        let Some(token) = self.session.get(AUTH_TOKEN_KEY)? else {
            return Ok(None);
        };

        match self.cookie.set(AUTH_TOKEN_KEY, &token) {
            Ok(()) => tracing::debug!("Session token migrated to cookie store"),
            Err(e) => tracing::warn!(error = %e, "Failed to migrate session token"),
        }
        Ok(Some(token))
    }

    /// Store a freshly issued token in both stores
    pub fn login(&self, token: &str) -> Result<(), SessionError> {
        self.cookie.set(AUTH_TOKEN_KEY, token)?;
        self.session.set(AUTH_TOKEN_KEY, token)?;
        Ok(())
    }

    /// Forget the token everywhere
    pub fn logout(&self) -> Result<(), SessionError> {
        self.cookie.remove(AUTH_TOKEN_KEY)?;
        self.session.remove(AUTH_TOKEN_KEY)?;
        Ok(())
    }

    /// Current status; unreadable storage counts as signed out
    pub fn status(&self) -> AuthStatus {
        match self.token() {
            Ok(Some(token)) => AuthStatus::Authenticated { token },
            Ok(None) => AuthStatus::Anonymous,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read session token");
                AuthStatus::Anonymous
            }
        }
    }

    pub fn api_base_url(&self) -> Result<Option<String>, SessionError> {
        self.cookie.get(API_BASE_URL_KEY)
    }

    pub fn set_api_base_url(&self, url: &str) -> Result<(), SessionError> {
        self.cookie.set(API_BASE_URL_KEY, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_session_token_migrates_to_cookie() {
        let cookie = Arc::new(MemoryStore::new());
        let session_store = Arc::new(MemoryStore::new());
        session_store.set(AUTH_TOKEN_KEY, "from-session").unwrap();

        let session = Session::new(cookie.clone(), session_store);
        assert_eq!(session.token().unwrap().as_deref(), Some("from-session"));
        assert_eq!(
            cookie.get(AUTH_TOKEN_KEY).unwrap().as_deref(),
            Some("from-session")
        );
    }

    #[test]
    fn test_cookie_wins_over_session() {
        let cookie = Arc::new(MemoryStore::new());
        let session_store = Arc::new(MemoryStore::new());
        cookie.set(AUTH_TOKEN_KEY, "cookie").unwrap();
        session_store.set(AUTH_TOKEN_KEY, "session").unwrap();

        let session = Session::new(cookie, session_store);
        assert_eq!(session.token().unwrap().as_deref(), Some("cookie"));
    }

    #[test]
    fn test_login_logout() {
        let session = Session::in_memory();
        assert_eq!(session.status(), AuthStatus::Anonymous);

        session.login("tok").unwrap();
        assert_eq!(session.status().token(), Some("tok"));

        session.logout().unwrap();
        assert!(!session.status().is_authenticated());
        assert_eq!(session.token().unwrap(), None);
    }

    #[test]
    fn test_cookie_file_session_persists_base_url() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        let session = Session::with_cookie_file(&path);
        session.login("tok").unwrap();
        session.set_api_base_url("http://192.168.1.20:8090").unwrap();

        // a new process only has the cookie file
        let next_run = Session::with_cookie_file(&path);
        assert_eq!(next_run.token().unwrap().as_deref(), Some("tok"));
        assert_eq!(
            next_run.api_base_url().unwrap().as_deref(),
            Some("http://192.168.1.20:8090")
        );
    }
}
