//! Session identity and the login state machine.
//!
//! [`SessionState::apply`] is a pure transition function; the async
//! orchestration around identity providers lives in
//! [`crate::domain::SessionManager`].

use std::fmt;

use serde::{Deserialize, Serialize};

use super::AuthFailure;

/// Opaque provider-issued user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

/// Raised for blank user identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("user id must not be empty")]
pub struct EmptyUserId;

impl UserId {
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyUserId> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(EmptyUserId);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = EmptyUserId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Who is signed in. Exists only while authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub user_id: UserId,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Provider-issued bearer token. Never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// A live session as reported by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSession {
    pub access_token: AccessToken,
    pub identity: SessionIdentity,
}

/// Session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Startup check for an existing session has not finished.
    Loading,
    Anonymous,
    /// A login attempt is with the provider.
    Authenticating,
    Authenticated(ProviderSession),
}

/// Inputs to [`SessionState::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Startup check finished.
    Restored(Option<ProviderSession>),
    LoginSubmitted,
    LoginAccepted(ProviderSession),
    LoginRejected(AuthFailure),
    LoggedOut,
    /// Provider reported the session is no longer valid.
    Expired,
    /// Provider pushed its current view of the session.
    ProviderChanged(Option<ProviderSession>),
}

/// Event not accepted in the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {event} while {state}")]
pub struct InvalidTransition {
    pub state: &'static str,
    pub event: &'static str,
}

impl SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Restored(_) => "restored",
            Self::LoginSubmitted => "login_submitted",
            Self::LoginAccepted(_) => "login_accepted",
            Self::LoginRejected(_) => "login_rejected",
            Self::LoggedOut => "logged_out",
            Self::Expired => "expired",
            Self::ProviderChanged(_) => "provider_changed",
        }
    }
}

fn settle(session: Option<ProviderSession>) -> SessionState {
    session.map_or(SessionState::Anonymous, SessionState::Authenticated)
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Anonymous => "anonymous",
            Self::Authenticating => "authenticating",
            Self::Authenticated(_) => "authenticated",
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&SessionIdentity> {
        match self {
            Self::Authenticated(session) => Some(&session.identity),
            _ => None,
        }
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        match self {
            Self::Authenticated(session) => Some(&session.access_token),
            _ => None,
        }
    }

    /// Next state after `event`.
    ///
    /// Provider pushes are ignored while a login is in flight; the login
    /// outcome settles the state instead. Logout and expiry are no-ops when
    /// nobody is signed in.
    ///
    /// # Examples
    /// ```
    /// use adoption_backend::domain::{SessionEvent, SessionState};
    ///
    /// let next = SessionState::Anonymous.apply(SessionEvent::LoginSubmitted).unwrap();
    /// assert_eq!(next, SessionState::Authenticating);
    /// ```
    pub fn apply(&self, event: SessionEvent) -> Result<SessionState, InvalidTransition> {
        use SessionEvent as E;
        use SessionState as S;

        let invalid = InvalidTransition {
            state: self.name(),
            event: event.name(),
        };
        match (self, event) {
            (S::Loading, E::Restored(session)) => Ok(settle(session)),
            (S::Anonymous, E::LoginSubmitted) => Ok(S::Authenticating),
            (S::Authenticating, E::LoginAccepted(session)) => Ok(S::Authenticated(session)),
            (S::Authenticating, E::LoginRejected(_)) => Ok(S::Anonymous),
            (S::Authenticating, E::ProviderChanged(_)) => Ok(S::Authenticating),
            (S::Authenticated(_) | S::Anonymous, E::LoggedOut | E::Expired) => Ok(S::Anonymous),
            (S::Loading, E::Expired) => Ok(S::Anonymous),
            (S::Loading | S::Anonymous | S::Authenticated(_), E::ProviderChanged(session)) => {
                Ok(settle(session))
            }
            _ => Err(invalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn session() -> ProviderSession {
        ProviderSession {
            access_token: AccessToken::new("token"),
            identity: SessionIdentity {
                user_id: UserId::new("u-1").expect("user id"),
                email: "admin@pets.com".into(),
                display_name: Some("Admin".into()),
            },
        }
    }

    #[rstest]
    fn happy_path_reaches_authenticated(session: ProviderSession) {
        let state = SessionState::Loading
            .apply(SessionEvent::Restored(None))
            .and_then(|s| s.apply(SessionEvent::LoginSubmitted))
            .and_then(|s| s.apply(SessionEvent::LoginAccepted(session.clone())))
            .expect("valid transitions");
        assert_eq!(state.identity(), Some(&session.identity));
    }

    #[rstest]
    #[case(AuthFailure::InvalidCredentials)]
    #[case(AuthFailure::FieldsMissing)]
    #[case(AuthFailure::TimedOut)]
    fn rejection_returns_to_anonymous(#[case] failure: AuthFailure) {
        let next = SessionState::Authenticating
            .apply(SessionEvent::LoginRejected(failure))
            .expect("valid transition");
        assert_eq!(next, SessionState::Anonymous);
    }

    #[rstest]
    #[case(SessionEvent::LoggedOut)]
    #[case(SessionEvent::Expired)]
    #[case(SessionEvent::ProviderChanged(None))]
    fn authenticated_drops_to_anonymous(session: ProviderSession, #[case] event: SessionEvent) {
        let next = SessionState::Authenticated(session)
            .apply(event)
            .expect("valid transition");
        assert_eq!(next, SessionState::Anonymous);
    }

    #[rstest]
    fn restored_session_authenticates(session: ProviderSession) {
        let next = SessionState::Loading
            .apply(SessionEvent::Restored(Some(session)))
            .expect("valid transition");
        assert!(next.is_authenticated());
    }

    #[rstest]
    fn provider_push_is_ignored_mid_login(session: ProviderSession) {
        let next = SessionState::Authenticating
            .apply(SessionEvent::ProviderChanged(Some(session)))
            .expect("valid transition");
        assert_eq!(next, SessionState::Authenticating);
    }

    #[rstest]
    #[case(SessionState::Loading)]
    #[case(SessionState::Authenticating)]
    fn login_cannot_start_twice_or_before_loading(#[case] state: SessionState) {
        let err = state
            .apply(SessionEvent::LoginSubmitted)
            .expect_err("invalid transition");
        assert_eq!(err.event, "login_submitted");
    }

    #[rstest]
    fn login_outcome_requires_pending_attempt(session: ProviderSession) {
        assert!(
            SessionState::Anonymous
                .apply(SessionEvent::LoginAccepted(session))
                .is_err()
        );
    }

    #[rstest]
    fn token_debug_is_redacted() {
        let rendered = format!("{:?}", AccessToken::new("secret"));
        assert!(!rendered.contains("secret"));
    }
}
