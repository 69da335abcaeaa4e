//! Portico kernel binary.

use std::net::SocketAddr;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use portico_kernel::cli::{self, Cli, Command};
use portico_kernel::config::Config;
use portico_kernel::routes;
use portico_kernel::state::AppState;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = cli.apply(Config::from_env().context("failed to load configuration")?);

    match cli.command() {
        Command::Serve => serve(config).await.map(|()| ExitCode::SUCCESS),
        Command::Routes => {
            cli::routes(&config, &mut std::io::stdout().lock())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => {
            let ok = cli::check(&config, &mut std::io::stdout().lock())?;
            Ok(if ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting Portico kernel");
    info!(
        port = config.port,
        modules_dir = %config.modules_dir.display(),
        "Configuration loaded"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config).context("failed to initialize application state")?;
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
