use axum::{Router, response::Json, routing::get};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use form_builder_api::middleware::cors::create_cors_layer;
use form_builder_api::routes;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG environment variable controls log level (default: info)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("Application starting...");

    let app_state = routes::create_app_state();
    tokio::fs::create_dir_all(&app_state.upload_dir).await?;
    info!("Staged uploads stored under {:?}", app_state.upload_dir);

    // Health checks + API routes nested under /api/v1
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/health", get(health_check))
        .nest("/api/v1", routes::create_api_router())
        .with_state(app_state);

    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(create_cors_layer()),
    );

    // Run server on configurable port (default 8081 for API)
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8081);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on {} (port {})", addr, port);
    info!("Health check available at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Handle both SIGINT (Ctrl+C) and SIGTERM (container stop)
    #[cfg(unix)]
    let shutdown_signal = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("SIGINT received, shutting down gracefully");
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down gracefully");
            }
        }
    };

    #[cfg(not(unix))]
    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Shutdown signal received");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "form-builder-api",
        "version": "1.0.0"
    }))
}
