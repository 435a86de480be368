// [apps/orchestrator/src/main.rs]
use std::net::SocketAddr;
use tracing::{error, info};
use warden_orchestrator::{bootstrap, routes, OrchestratorConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    warden_telemetry::init_tracing("warden-orchestrator");

    let config = match OrchestratorConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!("configuration error: {error}");
            std::process::exit(1);
        }
    };
    let listen_port = config.listen_port;

    let state = match bootstrap(config).await {
        Ok(state) => state,
        Err(error) => {
            error!("failed to connect to graph store: {error}");
            std::process::exit(1);
        }
    };

    let app = routes::build(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], listen_port));
    info!("warden-orchestrator listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            error!("failed to bind {addr}: {error}");
            std::process::exit(1);
        }
    };

    if let Err(error) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!("server error: {error}");
    }
}

/// Waits for SIGINT/SIGTERM so in-flight SSE connections and running
/// missions get a chance to observe cancellation rather than being
/// dropped mid-phase (§5, "Shutdown").
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received, draining connections");
}
