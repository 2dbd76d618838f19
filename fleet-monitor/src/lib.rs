pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod inspect;
pub mod manifest;
pub mod metrics;
pub mod registry;

// AppState must be defined in lib.rs to be visible to all modules
#[derive(Clone)]
pub struct AppState<Dev, H, U> {
    pub device_registry: Dev,
    pub heartbeat_registry: H,
    pub upload_stat_registry: U,
}

impl<Dev, H, U> AppState<Dev, H, U> {
    pub fn new(device_registry: Dev, heartbeat_registry: H, upload_stat_registry: U) -> Self {
        Self {
            device_registry,
            heartbeat_registry,
            upload_stat_registry,
        }
    }
}
