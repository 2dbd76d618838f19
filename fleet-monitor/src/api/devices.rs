use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use fleet_core::{DeviceId, DeviceMetrics, Heartbeat, UploadStat};

use crate::AppState;
use crate::registry::{DeviceRegistry, HeartbeatRegistry, UploadStatRegistry};

use super::{
    error::ApiError,
    models::{HeartbeatRequest, StatsRequest},
};

// The device is gated once, before the body is validated, so unknown
// devices get a 404 even with a malformed body.

/// POST /api/v1/devices/{device_id}/heartbeat
pub async fn receive_heartbeat<Dev, H, U>(
    Path(device_id): Path<String>,
    State(state): State<AppState<Dev, H, U>>,
    payload: Result<Json<HeartbeatRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError>
where
    Dev: DeviceRegistry,
    H: HeartbeatRegistry,
    U: UploadStatRegistry,
{
    let device_id = DeviceId::from(device_id);
    state.ensure_known(&device_id).await?;
    let Json(request) = payload?;

    state
        .record_heartbeat(Heartbeat {
            device_id,
            sent_at: request.sent_at,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/devices/{device_id}/stats
pub async fn receive_stats<Dev, H, U>(
    Path(device_id): Path<String>,
    State(state): State<AppState<Dev, H, U>>,
    payload: Result<Json<StatsRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError>
where
    Dev: DeviceRegistry,
    H: HeartbeatRegistry,
    U: UploadStatRegistry,
{
    let device_id = DeviceId::from(device_id);
    state.ensure_known(&device_id).await?;
    let Json(request) = payload?;

    state
        .record_upload_stat(UploadStat {
            device_id,
            sent_at: request.sent_at,
            upload_time: request.upload_time,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/devices/{device_id}/stats
pub async fn device_stats<Dev, H, U>(
    Path(device_id): Path<String>,
    State(state): State<AppState<Dev, H, U>>,
) -> Result<Json<DeviceMetrics>, ApiError>
where
    Dev: DeviceRegistry,
    H: HeartbeatRegistry,
    U: UploadStatRegistry,
{
    let metrics = state.device_metrics(&DeviceId::from(device_id)).await?;
    Ok(Json(metrics))
}
