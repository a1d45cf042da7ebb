use travelstay::api::{health_check, resource_router};
use travelstay::config::Config;
use travelstay::db;
use travelstay::schema::SchemaDeployer;

use axum::{routing::get, Router};
use std::time::Instant;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup log directory
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "/var/log/travelstay".to_string());

    // Create log directory if it doesn't exist
    std::fs::create_dir_all(&log_dir).unwrap_or_else(|e| {
        eprintln!("Warning: Could not create log directory {}: {}", log_dir, e);
    });

    // Create file appender with daily rotation
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "travelstay.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - both stdout and file
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("debug,travelstay=trace")),
        )
        // Console output
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        // File output with JSON format for easy parsing
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_writer(non_blocking),
        )
        .init();

    debug!("Logging initialized - log directory: {}", log_dir);

    // Load environment from .env file if present
    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env file found or error loading it: {}", e);
    }

    // Load configuration
    let config = Config::from_env()?;
    let socket_addr = config.socket_addr()?;

    info!("Starting travelstay on {}", socket_addr);
    info!("Pool max size: {}", config.pool_max_size);

    // Connect and deploy schema
    let pool = db::connect(&config).await?;

    let deployer = SchemaDeployer::new();
    let result = deployer.deploy(&pool).await?;
    info!(
        "Schema ready: {} tables created, {} unchanged",
        result.tables_created, result.tables_skipped
    );

    // Start time for uptime tracking
    let start_time = Instant::now();

    // Build router: health check plus the (empty) resource mount
    let app = Router::new()
        .route("/health", get(health_check))
        .with_state((pool.clone(), start_time))
        .nest("/api", resource_router())
        .layer(TraceLayer::new_for_http());

    // Create listener
    let listener = tokio::net::TcpListener::bind(&socket_addr).await?;
    info!("Server listening on {}", socket_addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
