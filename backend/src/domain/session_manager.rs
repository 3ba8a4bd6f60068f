//! Session orchestration on top of an [`IdentityProvider`].
//!
//! The manager owns the current [`SessionState`], publishes it on a
//! `watch` channel, and drives transitions from login/logout calls and
//! provider events. Every provider call is bounded by a timeout.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::ports::{IdentityProvider, IdentityProviderError, SessionChange, SessionChangeKind};
use super::{
    AccessToken, AuthFailure, InvalidTransition, LoginCredentials, PasswordResetRequest,
    ProviderSession, SessionEvent, SessionIdentity, SessionState, SignupForm,
};

/// Timeout applied to provider calls when none is configured.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Tracks one user's session against an identity provider.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use adoption_backend::domain::SessionManager;
/// use adoption_backend::outbound::identity::LocalIdentityProvider;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = Arc::new(LocalIdentityProvider::open(".adoption-session")?);
/// let manager = Arc::new(SessionManager::new(provider, Duration::from_secs(5)));
/// let _events = manager.subscribe();
/// manager.initialise(None).await;
/// manager.login("admin@pets.com", "admin123").await?;
/// assert!(manager.state().is_authenticated());
/// # Ok(())
/// # }
/// ```
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<SessionState>,
    timeout: Duration,
}

impl SessionManager {
    /// Start in [`SessionState::Loading`].
    pub fn new(provider: Arc<dyn IdentityProvider>, timeout: Duration) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self {
            provider,
            state,
            timeout,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn watch(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn identity(&self) -> Option<SessionIdentity> {
        self.state.borrow().identity().cloned()
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        self.state.borrow().access_token().cloned()
    }

    fn transition(&self, event: SessionEvent) -> Result<SessionState, InvalidTransition> {
        let mut outcome = Err(InvalidTransition {
            state: "unknown",
            event: "unknown",
        });
        self.state.send_if_modified(|state| match state.apply(event) {
            Ok(next) => {
                let changed = *state != next;
                if changed {
                    debug!(from = state.name(), to = next.name(), "session transition");
                }
                *state = next.clone();
                outcome = Ok(next);
                changed
            }
            Err(err) => {
                outcome = Err(err);
                false
            }
        });
        outcome
    }

    async fn call_provider<T, F>(&self, operation: &'static str, call: F) -> Result<T, AuthFailure>
    where
        F: Future<Output = Result<T, IdentityProviderError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => {
                match &error {
                    IdentityProviderError::InvalidCredentials
                    | IdentityProviderError::Rejected { .. }
                    | IdentityProviderError::Unsupported { .. } => {
                        warn!(operation, %error, "identity provider refused request");
                    }
                    _ => tracing::error!(operation, %error, "identity provider call failed"),
                }
                Err(error.into())
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "identity provider call timed out"
                );
                Err(AuthFailure::TimedOut)
            }
        }
    }

    /// Finish loading by asking the provider for an existing session.
    ///
    /// Provider failures settle on anonymous; they are logged, not returned.
    pub async fn initialise(&self, token: Option<AccessToken>) -> SessionState {
        let restored = self
            .call_provider("current_session", self.provider.current_session(token))
            .await
            .unwrap_or_else(|failure| {
                warn!(reason = %failure, "session restore failed; continuing anonymous");
                None
            });
        self.finish_loading(restored)
    }

    /// Finish loading without consulting the provider.
    pub fn initialise_anonymous(&self) -> SessionState {
        self.finish_loading(None)
    }

    /// Finish loading with a session the caller already holds, such as one
    /// read back from a cookie.
    pub fn initialise_with(&self, session: ProviderSession) -> SessionState {
        self.finish_loading(Some(session))
    }

    fn finish_loading(&self, session: Option<ProviderSession>) -> SessionState {
        match self.transition(SessionEvent::Restored(session)) {
            Ok(state) => state,
            // A provider push already ended loading.
            Err(_) => self.state(),
        }
    }

    /// Provider session while authenticated.
    pub fn provider_session(&self) -> Option<ProviderSession> {
        match &*self.state.borrow() {
            SessionState::Authenticated(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Sign in. Validation failures and provider rejections both leave the
    /// manager anonymous and return the reason.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionIdentity, AuthFailure> {
        if let Err(err) = self.transition(SessionEvent::LoginSubmitted) {
            warn!(%err, "login attempted outside the anonymous state");
            return Err(AuthFailure::Unexpected);
        }

        let outcome = match LoginCredentials::try_from_parts(email, password) {
            Ok(credentials) => {
                self.call_provider(
                    "sign_in_with_password",
                    self.provider.sign_in_with_password(&credentials),
                )
                .await
            }
            Err(failure) => Err(failure),
        };

        match outcome {
            Ok(session) => {
                let identity = session.identity.clone();
                self.transition(SessionEvent::LoginAccepted(session))
                    .map_err(|err| {
                        warn!(%err, "login outcome arrived after the attempt was abandoned");
                        AuthFailure::Unexpected
                    })?;
                info!(user_id = %identity.user_id, "signed in");
                Ok(identity)
            }
            Err(failure) => {
                let _ = self.transition(SessionEvent::LoginRejected(failure.clone()));
                info!(reason = failure.code(), "sign-in rejected");
                Err(failure)
            }
        }
    }

    /// Register an account. Form checks run before the provider is called;
    /// the session state is left untouched.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
        display_name: &str,
        redirect_url: &str,
    ) -> Result<(), AuthFailure> {
        let form = SignupForm::try_from_parts(email, password, confirm_password, display_name)?;
        self.call_provider("sign_up", self.provider.sign_up(&form, redirect_url))
            .await
    }

    /// Sign out. The local state always ends anonymous; a provider failure
    /// is logged because the token is discarded either way.
    pub async fn logout(&self) -> SessionState {
        if let Some(token) = self.access_token() {
            if let Err(failure) = self
                .call_provider("sign_out", self.provider.sign_out(&token))
                .await
            {
                warn!(reason = %failure, "provider sign-out failed; clearing local session");
            }
        }
        match self.transition(SessionEvent::LoggedOut) {
            Ok(state) => state,
            Err(err) => {
                warn!(%err, "logout ignored");
                self.state()
            }
        }
    }

    /// Ask the provider to email a reset link.
    pub async fn request_password_reset(
        &self,
        email: &str,
        redirect_url: &str,
    ) -> Result<(), AuthFailure> {
        let request = PasswordResetRequest::try_new(email)?;
        self.call_provider(
            "reset_password_for_email",
            self.provider.reset_password_for_email(&request, redirect_url),
        )
        .await
    }

    /// Apply a provider push to the state.
    pub fn on_provider_change(&self, change: SessionChange) {
        let event = match change.kind {
            SessionChangeKind::Expired => SessionEvent::Expired,
            SessionChangeKind::SignedIn | SessionChangeKind::SignedOut => {
                SessionEvent::ProviderChanged(change.session)
            }
        };
        if let Err(err) = self.transition(event) {
            debug!(%err, "provider session change ignored");
        }
    }

    /// Follow the provider's event stream until the returned guard drops.
    pub fn subscribe(self: &Arc<Self>) -> SessionSubscription {
        let mut events = self.provider.subscribe();
        let manager: Weak<Self> = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(change) => match manager.upgrade() {
                        Some(manager) => manager.on_provider_change(change),
                        None => break,
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "session change events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        SessionSubscription { task }
    }
}

/// Live subscription to provider session events. Dropping it stops the
/// listener task.
#[derive(Debug)]
pub struct SessionSubscription {
    task: JoinHandle<()>,
}

impl SessionSubscription {
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SessionSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "session_manager_tests.rs"]
mod tests;
