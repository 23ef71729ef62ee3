//! Management HTTP API.
//!
//! Thin transport over the apply API: encodes requests and maps error kinds
//! to HTTP statuses, nothing more. All orchestration lives in the manager.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::manager::TenantManager;
use crate::pool::InstancePool;

use self::auth::bearer_auth_middleware;
use self::handlers::*;

/// State injected into handlers.
#[derive(Clone)]
pub struct ApiState {
    pub manager: Arc<TenantManager>,
    pub pool: Arc<InstancePool>,
    pub api_key: Arc<String>,
}

pub fn build_router(state: ApiState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/api/v1/status", get(get_status))
        .route(
            "/api/v1/tenants/{tenant}/configuration",
            get(get_configuration),
        )
        .route(
            "/api/v1/tenants/{tenant}/extra-configuration",
            post(save_extra_configuration),
        )
        .route(
            "/api/v1/tenants/{tenant}/extra-configuration/{identifier}",
            axum::routing::delete(delete_extra_configuration),
        )
        .route("/api/v1/tenants/{tenant}/route-test", post(route_test))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            bearer_auth_middleware,
        ))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until the shutdown signal fires.
pub async fn serve(
    router: Router,
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Management API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Management API received shutdown signal");
        })
        .await
}
