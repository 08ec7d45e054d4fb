use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;

use geomcp_server::config;
use geomcp_server::provider::GoogleMapsClient;
use geomcp_server::{build_router, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("geomcp starting");

    // Load configuration; fail loudly on misconfiguration.
    let server_config = match config::load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration, refusing to start");
            std::process::exit(1);
        }
    };

    // Install Prometheus metrics recorder.
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");

    let provider = match GoogleMapsClient::new(server_config.provider.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build maps provider client");
            std::process::exit(1);
        }
    };

    let transport = server_config.transport.clone();
    let state = Arc::new(AppState::new(
        transport.clone(),
        Arc::new(provider),
        metrics_handle,
    ));
    let app = build_router(Arc::clone(&state));

    let address = format!("{}:{}", transport.host, transport.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind TCP listener");

    tracing::info!(
        address = %address,
        endpoint = %transport.endpoint_path,
        "geomcp listening"
    );

    // Open listen streams only end once their sessions close, so sessions
    // are torn down before the server waits for connections to drain.
    let sessions = Arc::clone(&state.sessions);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!(sessions = sessions.len(), "Shutdown signal received");
            sessions.shutdown();
        })
        .await
        .expect("HTTP server error");

    tracing::info!("geomcp stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
