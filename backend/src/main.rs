//! Backend entry point: loads settings, wires ports and runs the HTTP server.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use adoption_backend::domain::ports::IdentityProvider;
use adoption_backend::inbound::http::health::HealthState;
use adoption_backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use adoption_backend::settings::AppSettings;
use server::{ServerConfig, build_ports, create_server};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|error| eyre!("failed to load settings: {error}"))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::current())
        .wrap_err("invalid session configuration")?;
    info!(fingerprint = %session.key_fingerprint(), "session key loaded");

    let provider_timeout = settings.provider_timeout()?;
    let ports = build_ports(
        &settings.identity_provider()?,
        provider_timeout,
        settings.seed_sample_pets(),
    )?;
    log_provider_events(ports.identity.clone());

    let bind_addr = settings.bind_addr()?;
    let config = ServerConfig::new(session, bind_addr, ports, settings.public_origin()?)
        .with_provider_timeout(provider_timeout);
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).wrap_err("failed to start server")?;
    info!(%bind_addr, "listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated")
}

fn log_provider_events(provider: Arc<dyn IdentityProvider>) {
    let mut events = provider.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(change) => info!(kind = ?change.kind, "identity provider session changed"),
                Err(RecvError::Lagged(missed)) => warn!(missed, "session events dropped"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}
