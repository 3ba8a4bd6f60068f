//! File-backed demo identity provider.
//!
//! Accepts a single fixed account and keeps the signed-in session in a JSON
//! file so a restarted process picks it up again. Intended for local
//! development and tests; it offers no signup or password reset.
//!
//! File access is synchronous and runs on the calling task. The file holds
//! one small session and is touched only on sign-in, sign-out and restore.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::domain::ports::{
    IdentityProvider, IdentityProviderError, SESSION_EVENT_CAPACITY, SessionChange,
};
use crate::domain::{
    AccessToken, LoginCredentials, PasswordResetRequest, ProviderSession, SessionIdentity,
    SignupForm, UserId,
};

/// Only account the local provider accepts.
pub const DEMO_EMAIL: &str = "admin@pets.com";
pub const DEMO_PASSWORD: &str = "admin123";
/// Placeholder bearer token handed out on success.
pub const DEMO_ACCESS_TOKEN: &str = "local-demo-token";
const DEMO_USER_ID: &str = "local-admin";
const DEMO_DISPLAY_NAME: &str = "Admin";
const SESSION_FILE: &str = "session.json";

fn storage_error(action: &str, error: io::Error) -> IdentityProviderError {
    IdentityProviderError::storage(format!("{action} {SESSION_FILE}: {error}"))
}

/// Identity provider backed by a session file in a local directory.
#[derive(Debug)]
pub struct LocalIdentityProvider {
    dir: Dir,
    events: broadcast::Sender<SessionChange>,
}

impl LocalIdentityProvider {
    /// Open (creating if needed) the session directory at `path`.
    ///
    /// # Errors
    /// Returns [`IdentityProviderError::Storage`] when the directory cannot
    /// be created or opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, IdentityProviderError> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())
            .map_err(|err| storage_error("create directory for", err))?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())
            .map_err(|err| storage_error("open directory for", err))?;
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Ok(Self { dir, events })
    }

    fn demo_session() -> Result<ProviderSession, IdentityProviderError> {
        let user_id = UserId::new(DEMO_USER_ID)
            .map_err(|err| IdentityProviderError::decode(err.to_string()))?;
        Ok(ProviderSession {
            access_token: AccessToken::new(DEMO_ACCESS_TOKEN),
            identity: SessionIdentity {
                user_id,
                email: DEMO_EMAIL.to_owned(),
                display_name: Some(DEMO_DISPLAY_NAME.to_owned()),
            },
        })
    }

    fn load(&self) -> Result<Option<ProviderSession>, IdentityProviderError> {
        let raw = match self.dir.read_to_string(SESSION_FILE) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(storage_error("read", err)),
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| IdentityProviderError::decode(format!("{SESSION_FILE}: {err}")))
    }

    fn store(&self, session: &ProviderSession) -> Result<(), IdentityProviderError> {
        let body = serde_json::to_vec_pretty(session)
            .map_err(|err| IdentityProviderError::decode(err.to_string()))?;
        self.dir
            .write(SESSION_FILE, body)
            .map_err(|err| storage_error("write", err))
    }

    fn clear(&self) -> Result<(), IdentityProviderError> {
        match self.dir.remove_file(SESSION_FILE) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error("remove", err)),
        }
    }

    fn publish(&self, change: SessionChange) {
        // No receivers is fine.
        if self.events.send(change).is_err() {
            debug!("no session listeners attached");
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in_with_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ProviderSession, IdentityProviderError> {
        if credentials.email() != DEMO_EMAIL || credentials.password() != DEMO_PASSWORD {
            return Err(IdentityProviderError::invalid_credentials());
        }
        let session = Self::demo_session()?;
        self.store(&session)?;
        info!(user_id = DEMO_USER_ID, "local session stored");
        self.publish(SessionChange::signed_in(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        _form: &SignupForm,
        _redirect_url: &str,
    ) -> Result<(), IdentityProviderError> {
        Err(IdentityProviderError::unsupported("signup"))
    }

    async fn sign_out(&self, _token: &AccessToken) -> Result<(), IdentityProviderError> {
        self.clear()?;
        self.publish(SessionChange::signed_out());
        Ok(())
    }

    async fn reset_password_for_email(
        &self,
        _request: &PasswordResetRequest,
        _redirect_url: &str,
    ) -> Result<(), IdentityProviderError> {
        Err(IdentityProviderError::unsupported("password reset"))
    }

    async fn current_session(
        &self,
        token: Option<AccessToken>,
    ) -> Result<Option<ProviderSession>, IdentityProviderError> {
        let stored = self.load()?;
        Ok(match token {
            Some(token) => stored.filter(|session| session.access_token == token),
            None => stored,
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.events.subscribe()
    }
}
