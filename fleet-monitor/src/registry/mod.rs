pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use fleet_core::{DeviceId, Heartbeat, UploadStat};
use jiff::Timestamp;

/// The set of devices allowed to submit telemetry.
#[async_trait]
pub trait DeviceRegistry: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn exists(&self, id: &DeviceId) -> Result<bool, Self::Error>;

    /// All known identifiers in ascending order.
    async fn list(&self) -> Result<Vec<DeviceId>, Self::Error>;

    /// Inserts every identifier that is not already registered. Existing
    /// devices are left untouched.
    async fn batch_register(&self, ids: Vec<DeviceId>) -> Result<(), Self::Error>;
}

/// Append-only heartbeat log.
#[async_trait]
pub trait HeartbeatRegistry: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn store(&self, heartbeat: Heartbeat) -> Result<(), Self::Error>;

    /// Distinct send times for the device, oldest first.
    async fn distinct_timestamps(&self, id: &DeviceId) -> Result<Vec<Timestamp>, Self::Error>;

    /// Number of stored heartbeats, duplicates included.
    async fn count(&self, id: &DeviceId) -> Result<u64, Self::Error>;
}

/// Append-only upload performance log.
#[async_trait]
pub trait UploadStatRegistry: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn store(&self, stat: UploadStat) -> Result<(), Self::Error>;

    /// Mean upload time in nanoseconds, or `None` if the device has no samples.
    async fn average_upload_time(&self, id: &DeviceId) -> Result<Option<f64>, Self::Error>;

    async fn count(&self, id: &DeviceId) -> Result<u64, Self::Error>;
}
