use anyhow::{Context, Result};
use axum::serve;
use seeder_tracker::core::config::Config;
use seeder_tracker::core::routes::build_router;
use seeder_tracker::core::state::AppState;
use seeder_tracker::core::tracing_init::init_tracing;
use seeder_tracker::stores::peer_store::PeerStorage;
use seeder_tracker::utils::time::current_timestamp_millis;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, error, info, Level};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config_path = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        PathBuf::from("config.toml")
    };

    // Load and validate configuration
    let config = Config::from_file(&config_path)
        .context(format!(
            "Failed to load configuration from '{}'. \
            If this is your first time running the tracker, copy config.example.toml to config.toml and adjust the values.",
            config_path.display()
        ))?;

    init_tracing(&config.logging)?;

    // Build Tokio runtime with configured number of threads
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.server.num_threads)
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    runtime.block_on(async_main(config, config_path))
}

async fn async_main(config: Config, config_path: PathBuf) -> Result<()> {
    info!(
        config_path = %config_path.display(),
        port = config.server.port,
        num_threads = config.server.num_threads,
        interval = config.tracker.interval,
        peer_limit = config.tracker.peer_limit,
        real_ip_header = ?config.tracker.real_ip_header,
        failure_mode = ?config.tracker.failure_mode,
        log_level = %config.logging.level,
        log_format = %config.logging.format,
        "BitTorrent Tracker starting"
    );

    let addr = SocketAddr::new(config.server.bind_address, config.server.port);
    let cleanup_interval = config.storage.cleanup_interval;

    let state = Arc::new(AppState::new(config));

    spawn_cleanup_task(Arc::clone(&state.storage), cleanup_interval);

    info!(
        cleanup_interval_seconds = cleanup_interval,
        "Peer cleanup task started"
    );

    let app = build_router(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG))
                )
        );

    info!(address = %addr, "Starting TCP listener");

    let listener = TcpListener::bind(addr).await
        .context(format!("Failed to bind TCP listener to {}", addr))?;

    info!(address = %addr, "TCP listener bound successfully");

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>()
    )
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("TCP server error")?;

    info!("Shutting down gracefully");

    Ok(())
}

/// Spawn a background task that periodically purges expired peers
fn spawn_cleanup_task(storage: Arc<dyn PeerStorage>, cleanup_interval: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(cleanup_interval));

        loop {
            interval.tick().await;

            debug!("Running peer cleanup");
            match storage.purge_expired(current_timestamp_millis()).await {
                Ok(0) => debug!("Peer cleanup completed, no expired peers found"),
                Ok(removed) => {
                    let stats = storage.stats().await;
                    info!(
                        removed_peers = removed,
                        active_peers = stats.peers,
                        active_torrents = stats.torrents,
                        "Peer cleanup completed"
                    );
                }
                Err(e) => error!(error = %e, "Peer cleanup failed"),
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
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
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
