use fleet_core::DeviceId;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub sent_at: Timestamp,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsRequest {
    pub sent_at: Timestamp,
    /// Upload duration in nanoseconds
    pub upload_time: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceListResponse {
    pub devices: Vec<DeviceId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub database: String,
}
