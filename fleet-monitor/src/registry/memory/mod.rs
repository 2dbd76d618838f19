mod device;
mod heartbeat;
mod upload_stat;

pub use device::InMemoryDeviceRegistry;
pub use heartbeat::InMemoryHeartbeatRegistry;
pub use upload_stat::InMemoryUploadStatRegistry;
