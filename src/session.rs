//! Authenticated session: in-memory user + token, persisted across runs
//!
//! The stored session is only trusted after the backend re-confirms it:
//! `restore` replays the saved token against `/auth/me` and silently
//! discards the session when the backend rejects it.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, LoginRequest, RegisterRequest, RfpApi};
use crate::state::models::{Role, User};

/// On-disk session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: User,
}

/// File-backed storage for the session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Store at the platform default location
    pub fn new() -> Self {
        Self {
            path: Self::default_path(),
        }
    }

    /// Store at an explicit path (tests, alternate profiles)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "rfp", "rfp-client")
            .map(|dirs| dirs.data_dir().join("session.json"))
    }

    /// Load the persisted session, if any. A corrupt file reads as absent.
    pub fn load(&self) -> Option<StoredSession> {
        let path = self.path.as_ref()?;
        let content = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&content) {
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!(?path, %err, "discarding unreadable session file");
                None
            }
        }
    }

    /// Persist the session
    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(session)?;
            fs::write(path, content)?;
        }
        Ok(())
    }

    /// Remove the persisted session
    pub fn clear(&self) {
        if let Some(path) = &self.path {
            if path.exists() {
                if let Err(err) = fs::remove_file(path) {
                    tracing::warn!(?path, %err, "failed to remove session file");
                }
            }
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The authenticated session
#[derive(Debug)]
pub struct Session {
    user: Option<User>,
    token: Option<String>,
    store: SessionStore,
}

impl Session {
    pub fn new(store: SessionStore) -> Self {
        Self {
            user: None,
            token: None,
            store,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    /// Restore a persisted session and verify it against the backend.
    /// Returns the signed-in user when the token still works. A rejected
    /// or missing session just leaves the session signed out.
    pub async fn restore(&mut self, api: &dyn RfpApi) -> Option<User> {
        let stored = self.store.load()?;

        api.set_token(Some(stored.token.clone()));
        match api.me().await {
            Ok(user) => {
                self.token = Some(stored.token);
                self.user = Some(user.clone());
                Some(user)
            }
            Err(err) => {
                tracing::info!(%err, "stored session rejected, signing out");
                api.set_token(None);
                self.store.clear();
                None
            }
        }
    }

    /// Exchange credentials for a token, fetch the user behind it, and
    /// persist both. The token is cleared again if the user fetch fails.
    pub async fn login(
        &mut self,
        api: &dyn RfpApi,
        credentials: &LoginRequest,
    ) -> Result<User, ApiError> {
        let tokens = api.login(credentials).await?;
        api.set_token(Some(tokens.access_token.clone()));

        let user = match api.me().await {
            Ok(user) => user,
            Err(err) => {
                api.set_token(None);
                return Err(err);
            }
        };

        self.token = Some(tokens.access_token.clone());
        self.user = Some(user.clone());
        if let Err(err) = self.store.save(&StoredSession {
            token: tokens.access_token,
            user: user.clone(),
        }) {
            // A session that only lasts this run is still a session
            tracing::warn!(%err, "failed to persist session");
        }

        Ok(user)
    }

    /// Create an account, then sign in with the same credentials
    pub async fn register(
        &mut self,
        api: &dyn RfpApi,
        data: &RegisterRequest,
    ) -> Result<User, ApiError> {
        api.register(data).await?;
        self.login(
            api,
            &LoginRequest {
                username: data.username.clone(),
                password: data.password.clone(),
            },
        )
        .await
    }

    /// Sign out: drop the token everywhere, including from disk
    pub fn logout(&mut self, api: &dyn RfpApi) {
        api.set_token(None);
        self.store.clear();
        self.user = None;
        self.token = None;
    }

    /// Drop the in-memory session without touching the stored one; the
    /// next `restore` picks it back up.
    pub fn teardown(&mut self) {
        self.user = None;
        self.token = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AuthTokens, MockRfpApi};
    use tempfile::tempdir;

    fn sample_user() -> User {
        serde_json::from_value(serde_json::json!({
            "id": "user-1",
            "username": "buyer_01",
            "email": "buyer@example.com",
            "full_name": "Pat Buyer",
            "role": "buyer",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::with_path(dir.path().join("session.json"))
    }

    fn credentials() -> LoginRequest {
        LoginRequest {
            username: "buyer_01".to_string(),
            password: "Secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_installs_token_and_persists() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let mut api = MockRfpApi::new();
        api.expect_login().times(1).returning(|_| {
            Ok(AuthTokens {
                access_token: "tok-123".to_string(),
                token_type: "bearer".to_string(),
            })
        });
        api.expect_set_token()
            .withf(|token| token.as_deref() == Some("tok-123"))
            .times(1)
            .return_const(());
        api.expect_me().times(1).returning(|| Ok(sample_user()));

        let mut session = Session::new(store.clone());
        let user = session.login(&api, &credentials()).await.unwrap();

        assert_eq!(user.username, "buyer_01");
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok-123"));

        let stored = store.load().expect("session should be on disk");
        assert_eq!(stored.token, "tok-123");
        assert_eq!(stored.user.username, "buyer_01");
    }

    #[tokio::test]
    async fn test_login_failure_leaves_session_signed_out() {
        let dir = tempdir().unwrap();
        let mut api = MockRfpApi::new();
        api.expect_login().times(1).returning(|_| {
            Err(ApiError::Api {
                status: 401,
                message: "Incorrect username or password".to_string(),
            })
        });

        let mut session = Session::new(store_in(&dir));
        let err = session.login(&api, &credentials()).await.unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[tokio::test]
    async fn test_failed_user_fetch_clears_fresh_token() {
        let dir = tempdir().unwrap();
        let mut api = MockRfpApi::new();
        api.expect_login().times(1).returning(|_| {
            Ok(AuthTokens {
                access_token: "tok-123".to_string(),
                token_type: String::new(),
            })
        });
        api.expect_set_token().times(2).return_const(());
        api.expect_me()
            .times(1)
            .returning(|| Err(ApiError::Network("down".to_string())));

        let mut session = Session::new(store_in(&dir));
        assert!(session.login(&api, &credentials()).await.is_err());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_verifies_stored_token() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&StoredSession {
                token: "tok-old".to_string(),
                user: sample_user(),
            })
            .unwrap();

        let mut api = MockRfpApi::new();
        api.expect_set_token()
            .withf(|token| token.as_deref() == Some("tok-old"))
            .times(1)
            .return_const(());
        api.expect_me().times(1).returning(|| Ok(sample_user()));

        let mut session = Session::new(store);
        let user = session.restore(&api).await;
        assert_eq!(user.unwrap().username, "buyer_01");
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_restore_discards_rejected_session() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&StoredSession {
                token: "tok-expired".to_string(),
                user: sample_user(),
            })
            .unwrap();

        let mut api = MockRfpApi::new();
        api.expect_set_token().times(2).return_const(());
        api.expect_me().times(1).returning(|| {
            Err(ApiError::Api {
                status: 401,
                message: "token expired".to_string(),
            })
        });

        let mut session = Session::new(store.clone());
        assert!(session.restore(&api).await.is_none());
        assert!(!session.is_authenticated());
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_restore_with_no_stored_session_is_silent() {
        let dir = tempdir().unwrap();
        let api = MockRfpApi::new();

        let mut session = Session::new(store_in(&dir));
        assert!(session.restore(&api).await.is_none());
    }

    #[tokio::test]
    async fn test_register_signs_in_with_same_credentials() {
        let dir = tempdir().unwrap();
        let mut api = MockRfpApi::new();
        api.expect_register()
            .withf(|data| data.username == "buyer_01" && data.role == "buyer")
            .times(1)
            .returning(|_| Ok(sample_user()));
        api.expect_login()
            .withf(|c| c.username == "buyer_01" && c.password == "Secret1")
            .times(1)
            .returning(|_| {
                Ok(AuthTokens {
                    access_token: "tok-new".to_string(),
                    token_type: String::new(),
                })
            });
        api.expect_set_token().times(1).return_const(());
        api.expect_me().times(1).returning(|| Ok(sample_user()));

        let mut session = Session::new(store_in(&dir));
        let data = RegisterRequest {
            username: "buyer_01".to_string(),
            email: "buyer@example.com".to_string(),
            password: "Secret1".to_string(),
            full_name: "Pat Buyer".to_string(),
            role: "buyer".to_string(),
            company_name: None,
            phone: None,
        };
        let user = session.register(&api, &data).await.unwrap();
        assert_eq!(user.username, "buyer_01");
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&StoredSession {
                token: "tok-123".to_string(),
                user: sample_user(),
            })
            .unwrap();

        let mut api = MockRfpApi::new();
        api.expect_set_token()
            .withf(|token| token.is_none())
            .times(1)
            .return_const(());

        let mut session = Session::new(store.clone());
        session.logout(&api);

        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_teardown_keeps_stored_session() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store
            .save(&StoredSession {
                token: "tok-123".to_string(),
                user: sample_user(),
            })
            .unwrap();

        let mut session = Session::new(store.clone());
        session.teardown();

        assert!(!session.is_authenticated());
        assert!(store.load().is_some());
    }

    #[test]
    fn test_corrupt_session_file_reads_as_absent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = SessionStore::with_path(path);
        assert!(store.load().is_none());
    }
}
