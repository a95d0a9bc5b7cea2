use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use battlehub_core::{
    auth::{Authenticator, Credentials},
    session::{Role, SessionRecord},
    storage::StorageBackend,
};
use battlehub_storage::encrypted_store::EncryptedStore;
use tracing::{info, instrument};

use crate::{
    guard::{AuthState, GuardDecision},
    routes::{self, LOGIN_PATH},
};

/// Reserved logical key holding the `SessionRecord`.
pub const SESSION_KEY: &str = "battlehub_user";

/// Performs full navigations. A reload discards all in-memory state derived
/// from the previous session.
pub trait Navigator: Send + Sync {
    fn reload(&self, path: &str);
}

/// Navigator that only records where it was sent; used by tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visits(&self) -> Vec<String> {
        self.visits
            .lock()
            .map(|visits| visits.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.visits().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn reload(&self, path: &str) {
        if let Ok(mut visits) = self.visits.lock() {
            visits.push(path.to_string());
        }
    }
}

/// Single authoritative accessor for the signed-in caller.
///
/// Construct once and hand it (or an `Arc` of it) to every consumer that needs
/// identity; nothing else reads the session key directly.
pub struct SessionGate<B: StorageBackend> {
    store: Arc<EncryptedStore<B>>,
    navigator: Arc<dyn Navigator>,
}

impl<B: StorageBackend> SessionGate<B> {
    pub fn new(store: Arc<EncryptedStore<B>>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    pub fn store(&self) -> &EncryptedStore<B> {
        &self.store
    }

    /// Persist a freshly issued session, replacing any previous one.
    #[instrument(skip_all, fields(user_id = %record.user_id, role = %record.role))]
    pub fn login(&self, record: &SessionRecord) {
        self.store.set(SESSION_KEY, record);
        info!("session stored");
    }

    /// Current session, or `None` when absent or unreadable.
    pub fn current_session(&self) -> Option<SessionRecord> {
        self.store.get(SESSION_KEY)
    }

    pub fn current_role(&self) -> Option<Role> {
        self.current_session().map(|session| session.role)
    }

    pub fn state(&self) -> AuthState {
        AuthState::from_role(self.current_role())
    }

    /// Token to send as `Authorization: Bearer <token>`, if signed in.
    pub fn bearer_token(&self) -> Option<String> {
        self.current_session()
            .map(|session| session.token)
            .filter(|token| !token.is_empty())
    }

    /// Guard decision for navigating to `path` with the current session.
    pub fn guard(&self, path: &str) -> GuardDecision {
        routes::navigate(self.state(), path)
    }

    /// Where an already signed-in caller should be sent from the login screen.
    pub fn resume(&self) -> Option<&'static str> {
        self.current_role().map(routes::landing_path)
    }

    /// Drop the session and reload at the login entry point.
    #[instrument(skip_all)]
    pub fn logout(&self) {
        self.store.remove(SESSION_KEY);
        info!("session cleared");
        self.navigator.reload(LOGIN_PATH);
    }

    /// Exchange credentials for a session, store it, and return the landing path.
    #[instrument(skip_all, fields(authenticator = authenticator.name()))]
    pub async fn sign_in(
        &self,
        authenticator: &dyn Authenticator,
        credentials: &Credentials,
    ) -> Result<&'static str> {
        if !credentials.is_complete() {
            bail!("please enter both username and password");
        }
        let record = authenticator.authenticate(credentials).await?;
        self.login(&record);
        Ok(routes::landing_path(record.role))
    }
}
