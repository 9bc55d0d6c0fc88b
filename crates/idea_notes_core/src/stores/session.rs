//! Authentication status and identity.

use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use super::{failure_message, read, write, StoreError, StoreResult};
use crate::domain::{Credentials, StoredCredential};
use crate::ports::{AuthService, CredentialStore, PortError};
use crate::validation::{validate_password, validate_username};

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub authenticated: bool,
    pub username: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    fn from_credential(credential: Option<StoredCredential>) -> Self {
        match credential {
            Some(credential) => Self {
                authenticated: true,
                username: credential.username,
                ..Default::default()
            },
            None => Self::default(),
        }
    }
}

pub struct SessionStore {
    auth: Arc<dyn AuthService>,
    credentials: Arc<dyn CredentialStore>,
    state: RwLock<SessionState>,
}

impl SessionStore {
    /// Creates the store, rehydrating from whatever credential is already persisted.
    pub fn new(auth: Arc<dyn AuthService>, credentials: Arc<dyn CredentialStore>) -> Self {
        let state = SessionState::from_credential(credentials.load());
        Self {
            auth,
            credentials,
            state: RwLock::new(state),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        read(&self.state).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        read(&self.state).authenticated
    }

    pub async fn login(&self, username: &str, password: &str) -> StoreResult<()> {
        self.begin();
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        match self.auth.login(&credentials).await {
            Ok(_) => {
                info!(username, "Logged in");
                let mut state = write(&self.state);
                state.authenticated = true;
                state.username = Some(username.to_string());
                state.loading = false;
                Ok(())
            }
            Err(e) => {
                warn!(username, "Login failed: {}", e);
                Err(self.fail(e.into(), LOGIN_FAILED))
            }
        }
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, username: &str, password: &str) -> StoreResult<()> {
        self.begin();
        if let Err(message) = validate_username(username).and_then(|_| validate_password(password)) {
            return Err(self.fail(StoreError::Validation(message), REGISTER_FAILED));
        }
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        match self.auth.register(&credentials).await {
            Ok(user) => {
                info!(username = %user.username, "Registered new account");
                write(&self.state).loading = false;
                Ok(())
            }
            Err(e) => {
                warn!(username, "Registration failed: {}", e);
                Err(self.fail(e.into(), REGISTER_FAILED))
            }
        }
    }

    pub fn logout(&self) {
        self.auth.logout();
        let mut state = write(&self.state);
        state.authenticated = false;
        state.username = None;
        info!("Logged out");
    }

    /// Re-derives authentication from the persisted credential without a network
    /// round trip. An expired token still reads as authenticated until a request
    /// comes back 401.
    pub fn check_auth(&self) -> bool {
        let mut state = write(&self.state);
        self.follow_credentials(&mut state);
        state.authenticated
    }

    fn follow_credentials(&self, state: &mut SessionState) {
        let fresh = SessionState::from_credential(self.credentials.load());
        state.authenticated = fresh.authenticated;
        state.username = fresh.username;
    }

    fn begin(&self) {
        let mut state = write(&self.state);
        state.loading = true;
        state.error = None;
    }

    fn fail(&self, error: StoreError, fallback: &str) -> StoreError {
        let message = match &error {
            StoreError::Validation(m) => m.clone(),
            StoreError::Port(e) => failure_message(e, fallback),
        };
        let mut state = write(&self.state);
        if matches!(error, StoreError::Port(PortError::Unauthorized(_))) {
            // A 401 drops the persisted token, whatever the request was.
            self.follow_credentials(&mut state);
        }
        state.error = Some(message);
        state.loading = false;
        error
    }
}
