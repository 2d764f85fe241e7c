use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::monitor::WatcherStatus;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub uptime_secs: i64,
    pub maintenance_mode: bool,
    pub maintenance_changed_at: DateTime<Utc>,
    pub maintenance_changed_by: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MaintenanceResponse {
    pub maintenance_mode: bool,
    pub changed: bool,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let settings = state.live.snapshot();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        maintenance_mode: settings.maintenance_mode,
        maintenance_changed_at: settings.changed_at,
        maintenance_changed_by: settings.changed_by.clone(),
    })
}

pub async fn get_state(State(state): State<AdminState>) -> Json<WatcherStatus> {
    Json(state.status.borrow().clone())
}

pub async fn put_maintenance(
    State(state): State<AdminState>,
    Json(request): Json<MaintenanceRequest>,
) -> Json<MaintenanceResponse> {
    let changed = state.live.set_maintenance(request.enabled, "admin-api");
    Json(MaintenanceResponse {
        maintenance_mode: request.enabled,
        changed,
    })
}
