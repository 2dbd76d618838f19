use axum::{
    Json,
    extract::{Path, State},
};
use fleet_core::{DeviceCounts, DeviceId};

use crate::AppState;
use crate::registry::{DeviceRegistry, HeartbeatRegistry, UploadStatRegistry};

use super::{error::ApiError, models::DeviceListResponse};

/// GET /debug/devices
pub async fn list_devices<Dev, H, U>(
    State(state): State<AppState<Dev, H, U>>,
) -> Result<Json<DeviceListResponse>, ApiError>
where
    Dev: DeviceRegistry,
    H: HeartbeatRegistry,
    U: UploadStatRegistry,
{
    let devices = state.list_devices().await?;
    Ok(Json(DeviceListResponse { devices }))
}

/// GET /debug/stats/{device_id}
pub async fn device_counts<Dev, H, U>(
    Path(device_id): Path<String>,
    State(state): State<AppState<Dev, H, U>>,
) -> Result<Json<DeviceCounts>, ApiError>
where
    Dev: DeviceRegistry,
    H: HeartbeatRegistry,
    U: UploadStatRegistry,
{
    let counts = state.device_counts(&DeviceId::from(device_id)).await?;
    Ok(Json(counts))
}
