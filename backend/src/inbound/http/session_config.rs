//! Cookie session settings read from the environment.
//!
//! Debug builds fall back to permissive defaults with a warning; release
//! builds refuse to start unless every toggle is explicit and sane.
//!
//! | Variable                  | Meaning                         | Release    |
//! |---------------------------|---------------------------------|------------|
//! | `SESSION_KEY_FILE`        | path to >= 64 bytes of key data | required   |
//! | `SESSION_COOKIE_SECURE`   | mark the cookie `Secure`        | required   |
//! | `SESSION_SAMESITE`        | `Strict`, `Lax` or `None`       | required   |
//! | `SESSION_ALLOW_EPHEMERAL` | generate a key if none on disk  | must be 0  |
//! | `SESSION_TTL_HOURS`       | cookie lifetime, default 2      | optional   |

pub mod fingerprint;

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite, time::Duration};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

pub(crate) const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
pub(crate) const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
pub(crate) const TTL_HOURS_ENV: &str = "SESSION_TTL_HOURS";

const KEY_FILE_DEFAULT: &str = "/var/run/secrets/session_key";
pub(crate) const KEY_MIN_LEN: usize = 64;
const DEFAULT_TTL_HOURS: i64 = 2;
const MAX_TTL_HOURS: i64 = 24 * 30;

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const TTL_EXPECTED: &str = "whole hours between 1 and 720";

/// How strictly to validate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// Mode matching how this binary was compiled.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated session middleware settings.
#[derive(Clone)]
pub struct SessionSettings {
    pub key: Key,
    pub cookie_secure: bool,
    pub same_site: SameSite,
    pub ttl: Duration,
}

impl SessionSettings {
    /// Short hash of the signing key, safe to log.
    pub fn key_fingerprint(&self) -> String {
        fingerprint::key_fingerprint(&self.key)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Read and validate session settings.
///
/// # Examples
///
/// ```rust
/// use adoption_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).unwrap();
/// assert!(settings.cookie_secure);
/// assert_eq!(settings.ttl.whole_hours(), 2);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let lookup = Lookup { env, mode };
    let cookie_secure = lookup.required(COOKIE_SECURE_ENV, true, BOOL_EXPECTED, parse_bool)?;
    let same_site = lookup.required(SAMESITE_ENV, SameSite::Lax, SAMESITE_EXPECTED, parse_same_site)?;
    if same_site == SameSite::None && !cookie_secure {
        lookup.tolerate(SessionConfigError::InsecureSameSiteNone)?;
    }
    let allow_ephemeral = lookup.required(ALLOW_EPHEMERAL_ENV, false, BOOL_EXPECTED, parse_bool)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let ttl_hours = lookup.optional(TTL_HOURS_ENV, DEFAULT_TTL_HOURS, TTL_EXPECTED, parse_ttl)?;
    let key = read_key(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
        ttl: Duration::hours(ttl_hours),
    })
}

struct Lookup<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<E: Env> Lookup<'_, E> {
    /// Must be set in release builds; debug builds warn and use `fallback`.
    fn required<T>(
        &self,
        name: &'static str,
        fallback: T,
        expected: &'static str,
        parse: fn(&str) -> Option<T>,
    ) -> Result<T, SessionConfigError> {
        match self.env.string(name) {
            Some(value) => self.parsed(name, value, fallback, expected, parse),
            None => {
                self.tolerate(SessionConfigError::MissingEnv { name })?;
                Ok(fallback)
            }
        }
    }

    fn optional<T>(
        &self,
        name: &'static str,
        fallback: T,
        expected: &'static str,
        parse: fn(&str) -> Option<T>,
    ) -> Result<T, SessionConfigError> {
        match self.env.string(name) {
            Some(value) => self.parsed(name, value, fallback, expected, parse),
            None => Ok(fallback),
        }
    }

    fn parsed<T>(
        &self,
        name: &'static str,
        value: String,
        fallback: T,
        expected: &'static str,
        parse: fn(&str) -> Option<T>,
    ) -> Result<T, SessionConfigError> {
        if let Some(parsed) = parse(value.trim()) {
            return Ok(parsed);
        }
        self.tolerate(SessionConfigError::InvalidEnv {
            name,
            value,
            expected,
        })?;
        Ok(fallback)
    }

    /// Release builds fail on `error`; debug builds log it and carry on.
    fn tolerate(&self, error: SessionConfigError) -> Result<(), SessionConfigError> {
        match self.mode {
            BuildMode::Debug => {
                warn!(%error, "session setting tolerated in debug build");
                Ok(())
            }
            BuildMode::Release => Err(error),
        }
    }
}

fn read_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| KEY_FILE_DEFAULT.to_owned()),
    );
    let mut bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using temporary session key (dev only)");
            return Ok(Key::generate());
        }
        Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
    };

    let length = bytes.len();
    if length < KEY_MIN_LEN {
        bytes.zeroize();
        let error = SessionConfigError::KeyTooShort {
            path,
            length,
            min_len: KEY_MIN_LEN,
        };
        if mode == BuildMode::Release {
            return Err(error);
        }
        warn!(%error, "using temporary session key (dev only)");
        return Ok(Key::generate());
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    Ok(key)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

fn parse_ttl(value: &str) -> Option<i64> {
    value
        .parse::<i64>()
        .ok()
        .filter(|hours| (1..=MAX_TTL_HOURS).contains(hours))
}
