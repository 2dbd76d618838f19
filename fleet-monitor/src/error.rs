use fleet_core::DeviceId;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("Device {0} not found")]
    DeviceNotFound(DeviceId),

    #[error("store error: {0}")]
    Store(BoxError),
}

impl TelemetryError {
    pub fn store<E>(e: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Store(Box::new(e))
    }
}
