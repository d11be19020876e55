//! Service entry-point: loads settings, wires adapters, and serves HTTP.

mod server;

use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use user_intents::config::ServiceSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load_from_args(std::env::args_os())
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    info!(?settings, "settings loaded");
    let config =
        ServerConfig::from_settings(settings).map_err(|err| std::io::Error::other(err.to_string()))?;
    let (host, port) = config.bind_addr();
    info!(host, port, "starting HTTP server");

    let (server, health_state) = create_server(config).await?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}
