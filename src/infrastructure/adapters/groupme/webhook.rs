//! Callback webhook server

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::application::errors::BotError;
use crate::application::messaging::Router;
use crate::domain::entities::InboundEvent;

/// Routes: `POST /` for platform callbacks, `GET /health` for probes
pub fn build_app(router: Arc<Router>) -> axum::Router {
    axum::Router::new()
        .route("/", post(callback))
        .route("/health", get(health))
        .with_state(router)
}

/// Bind `0.0.0.0:port` and serve until `shutdown` resolves.
///
/// The app, and with it `router`, is dropped before this returns.
pub async fn serve<F>(router: Arc<Router>, port: u16, shutdown: F) -> Result<(), BotError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BotError::Network(format!("bind {} failed: {}", addr, e)))?;

    tracing::info!("Server listening on port {}", port);
    axum::serve(listener, build_app(router))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| BotError::Network(format!("serve failed: {}", e)))
}

/// The reply status never depends on the body or on what the handlers did.
async fn callback(State(router): State<Arc<Router>>, body: Bytes) -> StatusCode {
    let event: InboundEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Dropping unreadable callback ({}): {}", e, String::from_utf8_lossy(&body));
            return StatusCode::OK;
        }
    };

    tracing::info!("Callback received: {:?}", event);
    let route = router.process(&event);
    tracing::debug!("Callback routed: {:?}", route);
    StatusCode::OK
}

async fn health() -> &'static str {
    "ok"
}
