//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only ever see domain ports, so
//! tests can swap in mocks without any I/O.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::domain::SessionManager;
use crate::domain::ports::{IdentityProvider, PetCatalogueCommand, PetCatalogueQuery};

/// Parameter object bundling the port implementations used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub pets: Arc<dyn PetCatalogueQuery>,
    pub pets_command: Arc<dyn PetCatalogueCommand>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub pets: Arc<dyn PetCatalogueQuery>,
    pub pets_command: Arc<dyn PetCatalogueCommand>,
    pub identity: Arc<dyn IdentityProvider>,
    provider_timeout: Duration,
    public_origin: Url,
}

impl HttpState {
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// use adoption_backend::domain::PetCatalogueService;
    /// use adoption_backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use adoption_backend::outbound::identity::LocalIdentityProvider;
    /// use adoption_backend::outbound::memory::InMemoryPetRepository;
    ///
    /// let service = Arc::new(PetCatalogueService::new(Arc::new(InMemoryPetRepository::new())));
    /// let ports = HttpStatePorts {
    ///     pets: service.clone(),
    ///     pets_command: service,
    ///     identity: Arc::new(LocalIdentityProvider::open(".adoption-session").unwrap()),
    /// };
    /// let origin = url::Url::parse("http://localhost:8080").unwrap();
    /// let state = HttpState::new(ports, Duration::from_secs(5), origin);
    /// assert_eq!(state.signup_redirect_url(), "http://localhost:8080/");
    /// ```
    pub fn new(ports: HttpStatePorts, provider_timeout: Duration, public_origin: Url) -> Self {
        let HttpStatePorts {
            pets,
            pets_command,
            identity,
        } = ports;
        Self {
            pets,
            pets_command,
            identity,
            provider_timeout,
            public_origin,
        }
    }

    /// Fresh manager for one request's view of the session.
    pub fn session_manager(&self) -> SessionManager {
        SessionManager::new(self.identity.clone(), self.provider_timeout)
    }

    /// Where signup confirmation links land.
    pub fn signup_redirect_url(&self) -> String {
        self.redirect_to("/")
    }

    /// Where password reset links land.
    pub fn password_reset_redirect_url(&self) -> String {
        self.redirect_to(crate::domain::LOGIN_PATH)
    }

    fn redirect_to(&self, path: &str) -> String {
        let mut url = self.public_origin.clone();
        url.set_path(path);
        url.set_query(None);
        url.to_string()
    }
}
