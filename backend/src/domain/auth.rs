//! Authentication form inputs and the reasons an attempt can fail.
//!
//! Forms validate before any identity provider is contacted, so a rejected
//! signup never produces network traffic.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::looks_like_email;

/// Minimum password length accepted at signup.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Why an authentication attempt ended without a session.
///
/// `Display` yields the user-facing reason string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "message", rename_all = "snake_case")]
pub enum AuthFailure {
    InvalidCredentials,
    FieldsMissing,
    PasswordTooShort { min: usize },
    PasswordsDoNotMatch,
    InvalidEmail,
    /// Provider refused the request with its own explanation.
    Rejected(String),
    /// Provider could not be reached.
    Unavailable,
    TimedOut,
    Unexpected,
}

impl AuthFailure {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::FieldsMissing => "fields_missing",
            Self::PasswordTooShort { .. } => "password_too_short",
            Self::PasswordsDoNotMatch => "passwords_do_not_match",
            Self::InvalidEmail => "invalid_email",
            Self::Rejected(_) => "rejected",
            Self::Unavailable => "provider_unavailable",
            Self::TimedOut => "timed_out",
            Self::Unexpected => "unexpected",
        }
    }

    /// True for failures detected before talking to a provider.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::FieldsMissing
                | Self::PasswordTooShort { .. }
                | Self::PasswordsDoNotMatch
                | Self::InvalidEmail
        )
    }
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => f.write_str("invalid credentials"),
            Self::FieldsMissing => f.write_str("fields missing"),
            Self::PasswordTooShort { min } => {
                write!(f, "password too short (minimum {min} characters)")
            }
            Self::PasswordsDoNotMatch => f.write_str("passwords do not match"),
            Self::InvalidEmail => f.write_str("invalid email"),
            Self::Rejected(message) => f.write_str(message),
            Self::Unavailable => f.write_str("identity provider unavailable"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Unexpected => f.write_str("unexpected error"),
        }
    }
}

impl std::error::Error for AuthFailure {}

fn required_email(raw: &str) -> Result<String, AuthFailure> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(AuthFailure::FieldsMissing);
    }
    if !looks_like_email(email) {
        return Err(AuthFailure::InvalidEmail);
    }
    Ok(email.to_owned())
}

/// Email and password for a sign-in attempt.
///
/// ## Invariants
/// - `email` is trimmed, non-empty and shaped like an address.
/// - `password` is non-empty; whitespace is kept as typed.
///
/// # Examples
/// ```
/// use adoption_backend::domain::{AuthFailure, LoginCredentials};
///
/// let creds = LoginCredentials::try_from_parts(" admin@pets.com ", "admin123").unwrap();
/// assert_eq!(creds.email(), "admin@pets.com");
/// assert_eq!(
///     LoginCredentials::try_from_parts("", "x").unwrap_err(),
///     AuthFailure::FieldsMissing,
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthFailure> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthFailure::FieldsMissing);
        }
        Ok(Self {
            email: required_email(email)?,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated signup request.
///
/// Checks run in a fixed order: every field present, confirmation equal to
/// password, then minimum length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    email: String,
    password: Zeroizing<String>,
    display_name: String,
}

impl SignupForm {
    pub fn try_from_parts(
        email: &str,
        password: &str,
        confirm_password: &str,
        display_name: &str,
    ) -> Result<Self, AuthFailure> {
        let display_name = display_name.trim();
        if email.trim().is_empty()
            || password.is_empty()
            || confirm_password.is_empty()
            || display_name.is_empty()
        {
            return Err(AuthFailure::FieldsMissing);
        }
        if password != confirm_password {
            return Err(AuthFailure::PasswordsDoNotMatch);
        }
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(AuthFailure::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        Ok(Self {
            email: required_email(email)?,
            password: Zeroizing::new(password.to_owned()),
            display_name: display_name.to_owned(),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Address that should receive a password reset link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetRequest {
    email: String,
}

impl PasswordResetRequest {
    pub fn try_new(email: &str) -> Result<Self, AuthFailure> {
        Ok(Self {
            email: required_email(email)?,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}
