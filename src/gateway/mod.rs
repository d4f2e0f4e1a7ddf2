//! Service Facade
//!
//! HTTP/JSON surface of a node. Each RPC maps 1:1 to a POST endpoint; the
//! routes mounted depend on the node's role.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::NodeRole;
use state::AppState;

/// Build the router for `state.role`
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .route("/v1/getBalance", post(handlers::get_balance))
        .route("/v1/createAccount", post(handlers::create_account))
        .route("/v1/tx", post(handlers::tx));

    app = match state.role {
        NodeRole::Issuer => app
            .route("/v1/mint", post(handlers::mint))
            .route("/v1/admin/pendingRelays", get(handlers::list_pending_relays))
            .route(
                "/v1/admin/pendingRelays/{id}/retry",
                post(handlers::retry_pending_relay),
            )
            .route(
                "/v1/admin/pendingRelays/{id}/resolve",
                post(handlers::resolve_pending_relay),
            ),
        NodeRole::Participant => app.route("/v1/fund", post(handlers::fund)),
    };

    app.with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Serve on an already bound listener until ctrl-c
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    let role = state.role;
    let app = router(state);
    let addr = listener.local_addr().context("listener has no local address")?;

    tracing::info!(role = role.as_str(), %addr, "Gateway listening");
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

/// Bind `host:port` and serve
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port already in use?)", addr))?;
    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
