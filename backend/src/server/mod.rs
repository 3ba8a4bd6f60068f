//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::build_ports;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use adoption_backend::Trace;
#[cfg(debug_assertions)]
use adoption_backend::doc::ApiDoc;
use adoption_backend::inbound::http::auth::{
    current_session, login, logout, password_reset, signup,
};
use adoption_backend::inbound::http::health::{HealthState, live, ready};
use adoption_backend::inbound::http::navigation::navigation;
use adoption_backend::inbound::http::pets::{
    create_pet, delete_pet, get_pet, list_pets, pet_contact, update_pet,
};
use adoption_backend::inbound::http::session_config::SessionSettings;
use adoption_backend::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const SESSION_COOKIE: &str = "session";

fn session_middleware(settings: &SessionSettings) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), settings.key.clone())
        .cookie_name(SESSION_COOKIE.into())
        .cookie_path("/".into())
        .cookie_secure(settings.cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(settings.same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(settings.ttl))
        .build()
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: &SessionSettings,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let api = web::scope("/api/v1")
        .wrap(session_middleware(session))
        .service(list_pets)
        .service(create_pet)
        .service(pet_contact)
        .service(get_pet)
        .service(update_pet)
        .service(delete_pet)
        .service(login)
        .service(signup)
        .service(logout)
        .service(password_reset)
        .service(current_session)
        .service(navigation);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind the listener and mark the service ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        session,
        bind_addr,
        ports,
        provider_timeout,
        public_origin,
    } = config;
    let http_state = web::Data::new(HttpState::new(ports, provider_timeout, public_origin));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone(), &session)
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
