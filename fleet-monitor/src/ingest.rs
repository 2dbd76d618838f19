use fleet_core::{DeviceId, Heartbeat, UploadStat};
use tracing::{debug, warn};

use crate::AppState;
use crate::error::TelemetryError;
use crate::registry::{DeviceRegistry, HeartbeatRegistry, UploadStatRegistry};

impl<Dev, H, U> AppState<Dev, H, U>
where
    Dev: DeviceRegistry,
    H: HeartbeatRegistry,
    U: UploadStatRegistry,
{
    /// Whether telemetry for `id` may be recorded.
    pub async fn accept(&self, id: &DeviceId) -> Result<bool, TelemetryError> {
        self.device_registry
            .exists(id)
            .await
            .map_err(TelemetryError::store)
    }

    pub(crate) async fn ensure_known(&self, id: &DeviceId) -> Result<(), TelemetryError> {
        if self.accept(id).await? {
            Ok(())
        } else {
            warn!(device_id = %id, "unknown device");
            Err(TelemetryError::DeviceNotFound(id.clone()))
        }
    }

    pub async fn submit_heartbeat(&self, heartbeat: Heartbeat) -> Result<(), TelemetryError> {
        self.ensure_known(&heartbeat.device_id).await?;
        self.record_heartbeat(heartbeat).await
    }

    pub async fn submit_upload_stat(&self, stat: UploadStat) -> Result<(), TelemetryError> {
        self.ensure_known(&stat.device_id).await?;
        self.record_upload_stat(stat).await
    }

    /// Appends without consulting the registry. The caller must already have
    /// passed the device through [`Self::ensure_known`].
    pub(crate) async fn record_heartbeat(&self, heartbeat: Heartbeat) -> Result<(), TelemetryError> {
        debug!(device_id = %heartbeat.device_id, sent_at = %heartbeat.sent_at, "heartbeat received");

        self.heartbeat_registry
            .store(heartbeat)
            .await
            .map_err(TelemetryError::store)
    }

    pub(crate) async fn record_upload_stat(&self, stat: UploadStat) -> Result<(), TelemetryError> {
        debug!(
            device_id = %stat.device_id,
            sent_at = %stat.sent_at,
            upload_time = stat.upload_time,
            "upload stat received"
        );

        self.upload_stat_registry
            .store(stat)
            .await
            .map_err(TelemetryError::store)
    }
}
