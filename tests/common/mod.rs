use std::sync::Arc;

use anyhow::{Context as _, Result};

use beacon_api::app::memory::MemoryApp;
use beacon_api::auth::{generate_jwt, Claims};
use beacon_api::context::audit::CapturingAuditSink;
use beacon_api::model::new_id;
use beacon_api::{router, AppState};

/// One server per test: each test seeds its own facade state and reads its
/// own captured audit entries, so nothing is shared between tests.
pub struct TestServer {
    pub base_url: String,
    pub app: Arc<MemoryApp>,
    pub audit: Arc<CapturingAuditSink>,
}

pub async fn spawn_server() -> Result<TestServer> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let app = Arc::new(MemoryApp::new());
    let audit = Arc::new(CapturingAuditSink::new());
    let state = AppState {
        app: app.clone(),
        audit: audit.clone(),
    };

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("test server");
    });

    Ok(TestServer { base_url, app, audit })
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Mint a bearer token for a session holding the given permissions
pub fn bearer_token(user_id: &str, permissions: &[&str]) -> String {
    let claims = Claims::new(
        user_id.to_string(),
        new_id(),
        permissions.iter().map(|p| p.to_string()).collect(),
    );
    generate_jwt(claims).expect("jwt generation")
}

pub fn client() -> reqwest::Client {
    reqwest::Client::new()
}
