use fleet_core::{DeviceCounts, DeviceId};

use crate::AppState;
use crate::error::TelemetryError;
use crate::registry::{DeviceRegistry, HeartbeatRegistry, UploadStatRegistry};

impl<Dev, H, U> AppState<Dev, H, U>
where
    Dev: DeviceRegistry,
    H: HeartbeatRegistry,
    U: UploadStatRegistry,
{
    pub async fn list_devices(&self) -> Result<Vec<DeviceId>, TelemetryError> {
        self.device_registry
            .list()
            .await
            .map_err(TelemetryError::store)
    }

    /// Raw number of stored heartbeats and upload stats for a device.
    pub async fn device_counts(&self, id: &DeviceId) -> Result<DeviceCounts, TelemetryError> {
        self.ensure_known(id).await?;

        let heartbeat_count = self
            .heartbeat_registry
            .count(id)
            .await
            .map_err(TelemetryError::store)?;
        let stats_count = self
            .upload_stat_registry
            .count(id)
            .await
            .map_err(TelemetryError::store)?;

        Ok(DeviceCounts {
            device_id: id.clone(),
            heartbeat_count,
            stats_count,
        })
    }
}
