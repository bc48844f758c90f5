use std::net::SocketAddr;

use anyhow::Context;
use axum::Router;
use owls_web::WebConfig;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("owls_web=info,tower_http=info")),
        )
        .init();

    let config = WebConfig::from_env()?;
    info!(
        discord_configured = config.oauth().client_id().is_some(),
        redirect_uri = %config.oauth().redirect_uri(),
        api_base = %config.api().base_url(),
        canonical_origin = config.origins().canonical(),
        secure_cookies = config.secure_cookies(),
        "Configuration loaded"
    );

    let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string());
    let pages = Router::new().fallback_service(ServeDir::new(&static_dir));

    let app = owls_web::web_routes(config, pages).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()
        .context("BIND_ADDR must be a socket address")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, static_dir = %static_dir, "HTTP server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
