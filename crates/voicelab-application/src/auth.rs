//! Authentication workflow: login, registration, logout, and session restore.

use std::sync::Arc;

use tokio::sync::RwLock;

use voicelab_core::api::AuthApi;
use voicelab_core::session::{Session, SessionStore};
use voicelab_core::{Result, VoiceLabError};

/// Shown when a registration field is blank.
pub const REGISTER_FIELDS_REQUIRED: &str = "All fields are required.";
/// Shown when a login field is blank.
pub const LOGIN_FIELDS_REQUIRED: &str = "Please enter email and password.";

const DEFAULT_DISPLAY_NAME: &str = "User";

/// Owns the in-memory session and keeps it in sync with the session store.
///
/// All methods take `&self`; the controller is shared across workflows via
/// `Arc`.
pub struct AuthController {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn SessionStore>,
    session: RwLock<Session>,
}

impl AuthController {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            store,
            session: RwLock::new(Session::default()),
        }
    }

    /// Registers a new account. Success does not authenticate; the caller
    /// still has to log in.
    ///
    /// Blank fields are rejected locally, before any network call.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<()> {
        let (name, email, password) = (name.trim(), email.trim(), password.trim());
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(VoiceLabError::validation(REGISTER_FIELDS_REQUIRED));
        }

        self.api.register(name, email, password).await?;
        tracing::info!(email, "account registered");
        Ok(())
    }

    /// Exchanges credentials for a session and persists it.
    ///
    /// On failure the in-memory session and the store are left untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let (email, password) = (email.trim(), password.trim());
        if email.is_empty() || password.is_empty() {
            return Err(VoiceLabError::validation(LOGIN_FIELDS_REQUIRED));
        }

        let outcome = self.api.login(email, password).await?;
        let session = Session::new(
            outcome.access_token,
            outcome.name.unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            email,
        );

        self.store.save(&session).await?;
        *self.session.write().await = session.clone();
        tracing::info!(email, "logged in");
        Ok(session)
    }

    /// Clears the session unconditionally, in memory and in the store.
    /// Idempotent: logging out while logged out is a no-op.
    pub async fn logout(&self) -> Result<()> {
        *self.session.write().await = Session::default();
        self.store.clear().await?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Restores a previously persisted session into memory, if one exists.
    pub async fn restore(&self) -> Result<Option<Session>> {
        match self.store.load().await? {
            Some(session) => {
                *self.session.write().await = session.clone();
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// Snapshot of the current session.
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    /// The current bearer token. Empty when unauthenticated.
    pub async fn token(&self) -> String {
        self.session.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use voicelab_core::api::LoginOutcome;

    pub(crate) struct MockAuthApi {
        pub login_result: Mutex<Option<Result<LoginOutcome>>>,
        pub register_result: Mutex<Option<Result<()>>>,
        pub calls: AtomicUsize,
    }

    impl MockAuthApi {
        pub fn with_login(result: Result<LoginOutcome>) -> Self {
            Self {
                login_result: Mutex::new(Some(result)),
                register_result: Mutex::new(None),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_register(result: Result<()>) -> Self {
            Self {
                login_result: Mutex::new(None),
                register_result: Mutex::new(Some(result)),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl AuthApi for MockAuthApi {
        async fn register(&self, _name: &str, _email: &str, _password: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.register_result.lock().unwrap().take().unwrap()
        }

        async fn login(&self, _email: &str, _password: &str) -> Result<LoginOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.login_result.lock().unwrap().take().unwrap()
        }
    }

    /// In-memory stand-in for the file-backed session store.
    #[derive(Default)]
    pub(crate) struct MemorySessionStore {
        pub saved: Mutex<Option<Session>>,
    }

    #[async_trait::async_trait]
    impl SessionStore for MemorySessionStore {
        async fn load(&self) -> Result<Option<Session>> {
            Ok(self.saved.lock().unwrap().clone())
        }

        async fn save(&self, session: &Session) -> Result<()> {
            *self.saved.lock().unwrap() = Some(session.clone());
            Ok(())
        }

        async fn clear(&self) -> Result<()> {
            *self.saved.lock().unwrap() = None;
            Ok(())
        }
    }

    fn outcome(token: &str, name: Option<&str>) -> LoginOutcome {
        LoginOutcome {
            access_token: token.to_string(),
            name: name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_login_stores_and_persists_session() {
        let api = Arc::new(MockAuthApi::with_login(Ok(outcome("jwt-1", Some("Ada")))));
        let store = Arc::new(MemorySessionStore::default());
        let controller = AuthController::new(api, store.clone());

        let session = controller.login("ada@example.com", "secret").await.unwrap();

        assert_eq!(session.token, "jwt-1");
        assert_eq!(session.name, "Ada");
        assert_eq!(session.email, "ada@example.com");
        assert!(controller.is_authenticated().await);
        assert_eq!(store.saved.lock().unwrap().as_ref(), Some(&session));
    }

    #[tokio::test]
    async fn test_login_defaults_missing_name() {
        let api = Arc::new(MockAuthApi::with_login(Ok(outcome("jwt-1", None))));
        let controller = AuthController::new(api, Arc::new(MemorySessionStore::default()));

        let session = controller.login("ada@example.com", "secret").await.unwrap();
        assert_eq!(session.name, "User");
    }

    #[tokio::test]
    async fn test_login_rejects_blank_fields_without_network() {
        let api = Arc::new(MockAuthApi::with_login(Ok(outcome("jwt-1", None))));
        let controller = AuthController::new(api.clone(), Arc::new(MemorySessionStore::default()));

        let err = controller.login("   ", "secret").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), LOGIN_FIELDS_REQUIRED);
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
        assert!(!controller.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_failed_login_leaves_state_untouched() {
        let api = Arc::new(MockAuthApi::with_login(Err(VoiceLabError::auth_rejected(
            "Invalid credentials.",
        ))));
        let store = Arc::new(MemorySessionStore::default());
        let controller = AuthController::new(api, store.clone());

        let err = controller.login("ada@example.com", "wrong").await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid credentials.");
        assert!(!controller.is_authenticated().await);
        assert!(store.saved.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_blank_fields_without_network() {
        let api = Arc::new(MockAuthApi::with_register(Ok(())));
        let controller = AuthController::new(api.clone(), Arc::new(MemorySessionStore::default()));

        let err = controller.register("Ada", "", "secret").await.unwrap_err();
        assert_eq!(err.to_string(), REGISTER_FIELDS_REQUIRED);
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_register_success_does_not_authenticate() {
        let api = Arc::new(MockAuthApi::with_register(Ok(())));
        let controller = AuthController::new(api, Arc::new(MemorySessionStore::default()));

        controller.register("Ada", "ada@example.com", "secret").await.unwrap();
        assert!(!controller.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_logout_clears_memory_and_store() {
        let api = Arc::new(MockAuthApi::with_login(Ok(outcome("jwt-1", Some("Ada")))));
        let store = Arc::new(MemorySessionStore::default());
        let controller = AuthController::new(api, store.clone());

        controller.login("ada@example.com", "secret").await.unwrap();
        controller.logout().await.unwrap();

        assert!(!controller.is_authenticated().await);
        assert!(store.saved.lock().unwrap().is_none());

        // Logging out again is a no-op, not an error.
        controller.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_loads_persisted_session() {
        let store = Arc::new(MemorySessionStore::default());
        *store.saved.lock().unwrap() = Some(Session::new("jwt-9", "Ada", "ada@example.com"));

        let api = Arc::new(MockAuthApi::with_login(Ok(outcome("unused", None))));
        let controller = AuthController::new(api, store);

        let restored = controller.restore().await.unwrap();
        assert_eq!(restored.unwrap().token, "jwt-9");
        assert!(controller.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_restore_with_empty_store_stays_unauthenticated() {
        let api = Arc::new(MockAuthApi::with_login(Ok(outcome("unused", None))));
        let controller = AuthController::new(api, Arc::new(MemorySessionStore::default()));

        assert!(controller.restore().await.unwrap().is_none());
        assert!(!controller.is_authenticated().await);
    }
}
