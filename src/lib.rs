pub mod app;
pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::app::AppService;
use crate::context::audit::AuditSink;
use crate::handlers::{preference, scheme};

/// Shared request state: the business facade and the audit sink, both
/// behind capability traits so deployments and tests can swap them.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<dyn AppService>,
    pub audit: Arc<dyn AuditSink>,
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(scheme_routes())
        .merge(preference_routes())
        .route_layer(axum::middleware::from_fn(middleware::auth::session_middleware));

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Protected API
        .merge(protected)
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn scheme_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/schemes",
            get(scheme::get_schemes).post(scheme::create_scheme),
        )
        .route(
            "/api/v1/schemes/:scheme_id",
            get(scheme::get_scheme).delete(scheme::delete_scheme),
        )
        .route("/api/v1/schemes/:scheme_id/patch", put(scheme::patch_scheme))
        .route("/api/v1/schemes/:scheme_id/teams", get(scheme::get_teams_for_scheme))
        .route(
            "/api/v1/schemes/:scheme_id/channels",
            get(scheme::get_channels_for_scheme),
        )
}

fn preference_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/users/:user_id/preferences",
            get(preference::get_preferences).put(preference::update_preferences),
        )
        .route(
            "/api/v1/users/:user_id/preferences/delete",
            post(preference::delete_preferences),
        )
        .route(
            "/api/v1/users/:user_id/preferences/:category",
            get(preference::get_preferences_by_category),
        )
        .route(
            "/api/v1/users/:user_id/preferences/:category/name/:preference_name",
            get(preference::get_preference_by_category_and_name),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Beacon API (Rust)",
        "version": version,
        "description": "Permission scheme and user preference API built with Rust (Axum)",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "schemes": "/api/v1/schemes[/:scheme_id] (protected)",
            "preferences": "/api/v1/users/:user_id/preferences (protected)",
        }
    }))
}

async fn health() -> axum::response::Json<Value> {
    let now = chrono::Utc::now();

    axum::response::Json(json!({
        "status": "ok",
        "timestamp": now,
    }))
}
