//! Inventory backend - authentication, product catalog and goods receipts

use anyhow::{Context, Result, bail};
use axum::http::{HeaderValue, Method, header};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{Config, LoggingConfig};
use inventory_api::{AppState, create_router};
use inventory_auth::TokenService;
use inventory_db::{Database, Role};

/// Inventory backend REST server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "INVENTORY_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Token signing secret
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let mut config = Config::load(&args.config)?;
    if let Some(secret) = args.jwt_secret {
        config.auth.jwt_secret = secret;
    }

    // Initialize logging
    init_logging(&config.logging)?;

    info!("Starting inventory backend v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.jwt_secret.trim().is_empty() {
        bail!(
            "No token signing secret configured; set JWT_SECRET, \
             INVENTORY__AUTH__JWT_SECRET or auth.jwt_secret"
        );
    }
    let tokens = Arc::new(TokenService::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_hours,
    )?);

    // Initialize database
    ensure_database_dir(&config.database.url).await?;
    let db = Database::new(&config.database.url, config.database.pool_settings()).await?;
    check_roles(&db).await?;

    // Metrics recorder
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    // Create application state
    let state = AppState::new(db, tokens)?;

    // Create router
    let app = create_router(state, Some(Arc::new(metrics_handle)))
        .layer(cors_layer(&config.server.allowed_origin)?)
        .layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);
    info!("CORS enabled for origin: {}", config.server.allowed_origin);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&logging.level))?;

    match logging.format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
        _ => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
    }
    Ok(())
}

/// CORS policy for the single browser client
fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("Invalid allowed_origin: {}", origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}

/// Create the parent directory of a file-backed SQLite database
async fn ensure_database_dir(url: &str) -> Result<()> {
    let Some(path) = url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = path.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Make sure every role a route allow-list can name exists in storage
async fn check_roles(db: &Database) -> Result<()> {
    let stored = db.list_roles().await?;
    for role in Role::ALL {
        if !stored.iter().any(|r| r.id == role.id()) {
            bail!("Role {} ({}) is missing from the roles table", role.id(), role.display_name());
        }
    }
    info!("{} roles loaded", stored.len());
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
