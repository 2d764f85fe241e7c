//! Operator control surface.
//!
//! Bearer-token protected HTTP API for inspecting the watcher and toggling
//! maintenance mode without a restart.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use chrono::{DateTime, Utc};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, watch};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::LiveSettings;
use crate::monitor::WatcherStatus;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// Shared state injected into admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub live: Arc<LiveSettings>,
    pub status: watch::Receiver<WatcherStatus>,
    pub api_key: Arc<str>,
    pub started_at: DateTime<Utc>,
}

impl AdminState {
    pub fn new(
        live: Arc<LiveSettings>,
        status: watch::Receiver<WatcherStatus>,
        api_key: String,
    ) -> Self {
        Self {
            live,
            status,
            api_key: api_key.into(),
            started_at: Utc::now(),
        }
    }
}

#[allow(deprecated)]
pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/state", get(get_state))
        .route("/admin/maintenance", put(put_maintenance))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API until shutdown.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state() -> (AdminState, watch::Sender<WatcherStatus>) {
        let (tx, rx) = watch::channel(WatcherStatus::new("http://target/".to_string(), 200));
        let live = Arc::new(LiveSettings::new(false));
        (AdminState::new(live, rx, "secret".to_string()), tx)
    }

    #[tokio::test]
    async fn test_rejects_missing_token() {
        let (state, _tx) = state();
        let response = setup_admin_router(state)
            .oneshot(Request::get("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rejects_wrong_token() {
        let (state, _tx) = state();
        let response = setup_admin_router(state)
            .oneshot(
                Request::get("/admin/status")
                    .header("Authorization", "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_toggle_maintenance() {
        let (state, _tx) = state();
        let live = Arc::clone(&state.live);

        let response = setup_admin_router(state)
            .oneshot(
                Request::put("/admin/maintenance")
                    .header("Authorization", "Bearer secret")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"enabled": true}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(live.maintenance_mode());
        assert_eq!(live.snapshot().changed_by, "admin-api");

        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let parsed: MaintenanceResponse = serde_json::from_slice(&body).unwrap();
        assert!(parsed.maintenance_mode);
        assert!(parsed.changed);
    }

    #[tokio::test]
    async fn test_state_reflects_latest_status() {
        let (state, tx) = state();
        let mut status = WatcherStatus::new("http://target/".to_string(), 200);
        status.ticks = 42;
        status.sample_count = 42;
        tx.send_replace(status);

        let response = setup_admin_router(state)
            .oneshot(
                Request::get("/admin/state")
                    .header("Authorization", "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["ticks"], 42);
        assert_eq!(json["target"], "http://target/");
    }
}
