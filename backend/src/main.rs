//! Service entry point: loads settings, initialises tracing and runs the
//! HTTP server.

mod server;

use std::io;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use murmur::inbound::http::health::HealthState;
use murmur::inbound::http::session_config::{BuildMode, session_settings_from_env};
use server::{AppSettings, ServerConfig, create_server};

#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;
    let store = settings
        .store_settings()
        .map_err(|e| io::Error::other(format!("invalid MURMUR_PAGE_SIZE: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| io::Error::other(format!("invalid session configuration: {e}")))?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(session, store, settings.bind_addr());
    create_server(health_state, config)?.await
}
