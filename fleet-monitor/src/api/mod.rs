pub mod debug;
pub mod devices;
pub mod error;
pub mod models;

use axum::{
    Json, Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::registry::{DeviceRegistry, HeartbeatRegistry, UploadStatRegistry};

use models::RootResponse;

/// Builds the HTTP API. `store_kind` is only reported by the root endpoint.
pub fn router<Dev, H, U>(state: AppState<Dev, H, U>, store_kind: &'static str) -> Router
where
    Dev: DeviceRegistry,
    H: HeartbeatRegistry,
    U: UploadStatRegistry,
{
    Router::new()
        .route("/", get(move || root(store_kind)))
        .route("/health", get(health))
        .route(
            "/api/v1/devices/{device_id}/heartbeat",
            post(devices::receive_heartbeat::<Dev, H, U>),
        )
        .route(
            "/api/v1/devices/{device_id}/stats",
            post(devices::receive_stats::<Dev, H, U>).get(devices::device_stats::<Dev, H, U>),
        )
        .route("/debug/devices", get(debug::list_devices::<Dev, H, U>))
        .route(
            "/debug/stats/{device_id}",
            get(debug::device_counts::<Dev, H, U>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root(store_kind: &'static str) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Fleet Monitoring API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: store_kind.to_string(),
    })
}

async fn health() -> &'static str {
    "OK"
}
