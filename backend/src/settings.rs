//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `ADOPTION_*` environment variables and config
//! files. Everything is optional; accessors apply defaults and validate.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::DEFAULT_PROVIDER_TIMEOUT;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_MOCK_SESSION_DIR: &str = ".adoption-session";

/// Which identity provider backs sign-in.
#[derive(Clone, PartialEq, Eq)]
pub enum IdentityProviderSettings {
    /// Single demo account persisted under `session_dir`.
    Mock { session_dir: PathBuf },
    /// GoTrue-compatible service rooted at `url`.
    Remote { url: Url, api_key: String },
}

impl fmt::Debug for IdentityProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock { session_dir } => f
                .debug_struct("Mock")
                .field("session_dir", session_dir)
                .finish(),
            Self::Remote { url, .. } => f
                .debug_struct("Remote")
                .field("url", &url.as_str())
                .field("api_key", &"<redacted>")
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("unknown identity provider '{value}'; expected mock|remote")]
    ProviderMode { value: String },
    #[error("{name} is required when identity_provider=remote")]
    MissingRemote { name: &'static str },
    #[error("invalid {name} '{value}': {source}")]
    Url {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("provider_timeout_ms must be greater than zero")]
    ZeroTimeout,
}

/// Top-level configuration.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADOPTION")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// `mock` (default) or `remote`.
    pub identity_provider: Option<String>,
    /// Project URL of the GoTrue service, e.g. `https://x.supabase.co`. The
    /// `/auth/v1` root itself is accepted too.
    pub remote_url: Option<String>,
    /// Public API key sent as `apikey` on every provider request.
    pub remote_api_key: Option<String>,
    /// Where the mock provider keeps its session file.
    pub mock_session_dir: Option<PathBuf>,
    /// Upper bound for each identity provider call.
    pub provider_timeout_ms: Option<u64>,
    /// Origin used in signup and password reset links.
    pub public_origin: Option<String>,
    /// Load the six sample pets at startup. Defaults to on.
    pub seed_sample_pets: Option<bool>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("identity_provider", &self.identity_provider)
            .field("remote_url", &self.remote_url)
            .field(
                "remote_api_key",
                &self.remote_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("mock_session_dir", &self.mock_session_dir)
            .field("provider_timeout_ms", &self.provider_timeout_ms)
            .field("public_origin", &self.public_origin)
            .field("seed_sample_pets", &self.seed_sample_pets)
            .finish()
    }
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    pub fn identity_provider(&self) -> Result<IdentityProviderSettings, SettingsError> {
        let mode = self.identity_provider.as_deref().unwrap_or("mock").trim();
        match mode.to_ascii_lowercase().as_str() {
            "mock" => Ok(IdentityProviderSettings::Mock {
                session_dir: self
                    .mock_session_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_MOCK_SESSION_DIR)),
            }),
            "remote" => {
                let raw_url = non_blank(self.remote_url.as_deref())
                    .ok_or(SettingsError::MissingRemote { name: "remote_url" })?;
                let api_key = non_blank(self.remote_api_key.as_deref()).ok_or(
                    SettingsError::MissingRemote {
                        name: "remote_api_key",
                    },
                )?;
                Ok(IdentityProviderSettings::Remote {
                    url: parse_url("remote_url", raw_url)?,
                    api_key: api_key.to_owned(),
                })
            }
            _ => Err(SettingsError::ProviderMode {
                value: mode.to_owned(),
            }),
        }
    }

    pub fn provider_timeout(&self) -> Result<Duration, SettingsError> {
        match self.provider_timeout_ms {
            None => Ok(DEFAULT_PROVIDER_TIMEOUT),
            Some(0) => Err(SettingsError::ZeroTimeout),
            Some(ms) => Ok(Duration::from_millis(ms)),
        }
    }

    pub fn seed_sample_pets(&self) -> bool {
        self.seed_sample_pets.unwrap_or(true)
    }

    pub fn public_origin(&self) -> Result<Url, SettingsError> {
        parse_url(
            "public_origin",
            self.public_origin.as_deref().unwrap_or(DEFAULT_PUBLIC_ORIGIN),
        )
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn parse_url(name: &'static str, value: &str) -> Result<Url, SettingsError> {
    Url::parse(value).map_err(|source| SettingsError::Url {
        name,
        value: value.to_owned(),
        source,
    })
}
