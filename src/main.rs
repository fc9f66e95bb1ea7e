use std::sync::Arc;

use beacon_api::app::memory::MemoryApp;
use beacon_api::context::audit::TracingAuditSink;
use beacon_api::{router, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up JWT_SECRET, APP_ENV, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = beacon_api::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Beacon API in {:?} mode", config.environment);

    let state = AppState {
        app: Arc::new(MemoryApp::new()),
        audit: Arc::new(TracingAuditSink),
    };
    let app = router(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("BEACON_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Beacon API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
