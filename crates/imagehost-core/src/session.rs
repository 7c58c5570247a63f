//! Authentication state and token persistence.

use std::cell::RefCell;

use tracing::{debug, info};

use crate::api::ImageApi;
use crate::error::ClientError;
use crate::model::{AuthToken, Credentials};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Key-value persistence for the auth token (browser `localStorage`,
/// an in-memory map in tests).
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str);
    fn clear(&self);
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RefCell<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RefCell::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn save(&self, token: &str) {
        *self.token.borrow_mut() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.borrow_mut() = None;
    }
}

/// The signed-in user, if any.
#[derive(Debug)]
pub struct Session<S> {
    store: S,
    token: RefCell<Option<AuthToken>>,
}

impl<S: TokenStore> Session<S> {
    /// Restore a session from the store at startup.
    pub fn restore(store: S) -> Self {
        let token = store
            .load()
            .filter(|t| !t.trim().is_empty())
            .map(AuthToken::new);
        debug!(restored = token.is_some(), "session restored");
        Self {
            store,
            token: RefCell::new(token),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    /// Current token, for authenticated calls.
    pub fn token(&self) -> Result<AuthToken, ClientError> {
        self.token
            .borrow()
            .clone()
            .ok_or(ClientError::NotAuthenticated)
    }

    pub async fn login<A: ImageApi>(
        &self,
        api: &A,
        credentials: &Credentials,
    ) -> Result<(), ClientError> {
        Self::check(credentials)?;
        let token = api
            .login(credentials)
            .await
            .map_err(ClientError::AuthenticationFailed)?;
        self.adopt(token);
        info!(user = %credentials.username, "logged in");
        Ok(())
    }

    /// Create an account. `confirmation` must repeat the password, and the
    /// password must be at least [`MIN_PASSWORD_LEN`] characters; both are
    /// checked before any request.
    pub async fn register<A: ImageApi>(
        &self,
        api: &A,
        credentials: &Credentials,
        confirmation: &str,
    ) -> Result<(), ClientError> {
        Self::check_registration(credentials, confirmation)?;
        let token = api
            .register(credentials)
            .await
            .map_err(ClientError::RegistrationFailed)?;
        self.adopt(token);
        info!(user = %credentials.username, "registered");
        Ok(())
    }

    /// Forget the token, locally and in the store.
    pub fn logout(&self) {
        self.store.clear();
        *self.token.borrow_mut() = None;
        info!("logged out");
    }

    fn check(credentials: &Credentials) -> Result<(), ClientError> {
        if credentials.is_complete() {
            Ok(())
        } else {
            Err(ClientError::InvalidCredentials)
        }
    }

    fn check_registration(credentials: &Credentials, confirmation: &str) -> Result<(), ClientError> {
        Self::check(credentials)?;
        if confirmation.is_empty() {
            return Err(ClientError::InvalidCredentials);
        }
        if credentials.password != confirmation {
            return Err(ClientError::PasswordMismatch);
        }
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ClientError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        Ok(())
    }

    fn adopt(&self, token: AuthToken) {
        self.store.save(token.as_str());
        *self.token.borrow_mut() = Some(token);
    }
}
