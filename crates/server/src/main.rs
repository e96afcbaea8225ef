//! roompoll server entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use roompoll_api::{AppState, apply_layers, router as api_router};
use roompoll_common::Config;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "roompoll")]
#[command(about = "Room-scoped polling and voting server", long_about = None)]
struct Cli {
    /// Configuration file to load instead of the `config/` directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply migrations and serve the HTTP API (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Provision a new admin principal and print its admin code
    CreateAdmin,
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "roompoll=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    init_tracing(config.logging.json);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Migrate => migrate(&config).await,
        Commands::CreateAdmin => create_admin(&config).await,
    }
}

async fn migrate(config: &Config) -> Result<()> {
    let db = roompoll_db::init(config).await?;
    info!("Running database migrations...");
    roompoll_db::migrate(&db).await?;
    info!("Migrations completed");
    Ok(())
}

async fn create_admin(config: &Config) -> Result<()> {
    let db = roompoll_db::init(config).await?;
    let state = AppState::new(Arc::new(db));

    let admin_code = state.room_service.create_admin().await?;
    println!("{admin_code}");
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting roompoll server...");

    let db = roompoll_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    roompoll_db::migrate(&db).await?;
    info!("Migrations completed");

    let state = AppState::new(Arc::new(db));
    let app = apply_layers(api_router().with_state(state));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
