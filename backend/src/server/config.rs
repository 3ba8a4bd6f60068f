//! HTTP server configuration object.

use std::net::SocketAddr;
use std::time::Duration;

use adoption_backend::inbound::http::session_config::SessionSettings;
use adoption_backend::inbound::http::state::HttpStatePorts;
use url::Url;

/// Everything `create_server` needs besides the health flags.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) ports: HttpStatePorts,
    pub(crate) provider_timeout: Duration,
    pub(crate) public_origin: Url,
}

impl ServerConfig {
    #[must_use]
    pub fn new(
        session: SessionSettings,
        bind_addr: SocketAddr,
        ports: HttpStatePorts,
        public_origin: Url,
    ) -> Self {
        Self {
            session,
            bind_addr,
            ports,
            provider_timeout: adoption_backend::domain::DEFAULT_PROVIDER_TIMEOUT,
            public_origin,
        }
    }

    /// Override the per-call identity provider timeout.
    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }
}
