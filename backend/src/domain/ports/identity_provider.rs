//! Driven port for the external identity provider.
//!
//! Both the hosted REST provider and the local mock implement
//! [`IdentityProvider`]; the session manager only ever sees this trait.
//! Providers also push [`SessionChange`] events over a broadcast channel so
//! subscribers stay consistent with the provider's view of the session.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::define_port_error;
use crate::domain::{
    AccessToken, AuthFailure, LoginCredentials, PasswordResetRequest, ProviderSession, SignupForm,
};

/// Capacity of provider event channels.
pub const SESSION_EVENT_CAPACITY: usize = 16;

/// What happened to the provider-side session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChangeKind {
    SignedIn,
    SignedOut,
    /// The provider rejected a previously valid token.
    Expired,
}

/// Event pushed to subscribers whenever the session changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    pub kind: SessionChangeKind,
    pub session: Option<ProviderSession>,
}

impl SessionChange {
    pub fn signed_in(session: ProviderSession) -> Self {
        Self {
            kind: SessionChangeKind::SignedIn,
            session: Some(session),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            kind: SessionChangeKind::SignedOut,
            session: None,
        }
    }

    pub fn expired() -> Self {
        Self {
            kind: SessionChangeKind::Expired,
            session: None,
        }
    }
}

define_port_error! {
    /// Failures reported by identity provider adapters.
    pub enum IdentityProviderError {
        /// Email/password pair not accepted.
        InvalidCredentials => "invalid credentials",
        /// Provider refused the request and said why.
        Rejected { message: String } => "identity provider rejected request: {message}",
        /// Operation not offered by this provider.
        Unsupported { operation: String } => "{operation} is not supported by this identity provider",
        /// Provider could not be reached or answered with a server error.
        Unavailable { message: String } => "identity provider unavailable: {message}",
        /// Provider did not answer in time.
        Timeout { message: String } => "identity provider timed out: {message}",
        /// Provider answered with a payload we could not read.
        Decode { message: String } => "identity provider response invalid: {message}",
        /// Local storage for the session failed.
        Storage { message: String } => "session storage failed: {message}",
    }
}

impl From<IdentityProviderError> for AuthFailure {
    fn from(value: IdentityProviderError) -> Self {
        match value {
            IdentityProviderError::InvalidCredentials => Self::InvalidCredentials,
            IdentityProviderError::Rejected { message } => Self::Rejected(message),
            error @ IdentityProviderError::Unsupported { .. } => Self::Rejected(error.to_string()),
            IdentityProviderError::Unavailable { .. } => Self::Unavailable,
            IdentityProviderError::Timeout { .. } => Self::TimedOut,
            IdentityProviderError::Decode { .. } | IdentityProviderError::Storage { .. } => {
                Self::Unexpected
            }
        }
    }
}

/// Email/password identity provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange credentials for a session.
    async fn sign_in_with_password(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ProviderSession, IdentityProviderError>;

    /// Register an account. Confirmation links point at `redirect_url`.
    async fn sign_up(
        &self,
        form: &SignupForm,
        redirect_url: &str,
    ) -> Result<(), IdentityProviderError>;

    /// End the session behind `token`.
    async fn sign_out(&self, token: &AccessToken) -> Result<(), IdentityProviderError>;

    /// Send a password reset link pointing at `redirect_url`.
    async fn reset_password_for_email(
        &self,
        request: &PasswordResetRequest,
        redirect_url: &str,
    ) -> Result<(), IdentityProviderError>;

    /// Session currently valid for `token`, or the provider's stored session
    /// when no token is given. `Ok(None)` means nobody is signed in.
    async fn current_session(
        &self,
        token: Option<AccessToken>,
    ) -> Result<Option<ProviderSession>, IdentityProviderError>;

    /// Stream of session changes.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}
