//! jwt-gate: HS256 bearer tokens for a demo login, with role-gated endpoints.
//! Used by: binary entrypoint.

pub mod auth;
pub mod config;
pub mod console;
pub mod error;
pub mod handlers;
pub mod ratelimit;
pub mod server;
pub mod state;
pub mod telemetry;
pub mod token;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Misconfiguration stops the process here, before any request is served.
    let config = config::Config::from_env()?;
    tracing::info!(jwt = ?config.jwt, "configuration loaded");

    let state = state::build_state(&config)?;

    console::print_banner();
    console::print_startup(
        &config.bind_addr,
        &config.jwt.issuer,
        &config.jwt.audience,
        config.jwt.expiration_minutes,
    );
    tracing::info!("starting jwt-gate on {}", config.bind_addr);

    server::run(state, &config.bind_addr).await?;
    Ok(())
}
