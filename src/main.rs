use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use seatline::config::{Cli, Config, SECRET_KEY_ENV};
use seatline::db;
use seatline::routes;
use seatline::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;
    if config.uses_default_secret() {
        tracing::warn!(
            "Using the built-in cookie signing key; set {} before exposing this server",
            SECRET_KEY_ENV
        );
    }

    // Initialize database
    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;
    let seeded = db::seed_admins(&pool, &config.admins)?;
    if seeded > 0 {
        tracing::info!("Created {} admin account(s) from config", seeded);
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = routes::router(AppState::new(pool, config));

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
