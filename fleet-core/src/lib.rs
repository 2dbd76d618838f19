use std::fmt;

use serde::{Deserialize, Serialize};

mod duration;

pub use duration::format_duration_nanos;

// We use `Box<str>` for identifiers that never grow after construction. This
// keeps them compact and makes accidental mutation impossible.
type BoxStr = Box<str>;

/// Opaque, case-sensitive identifier of a fleet device.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub BoxStr);

impl DeviceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(id: &str) -> Self {
        Self(id.into())
    }
}

impl From<String> for DeviceId {
    fn from(id: String) -> Self {
        Self(id.into_boxed_str())
    }
}

/// A liveness ping sent by a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Device that sent the ping.
    pub device_id: DeviceId,
    /// Device-reported send time. Not checked against the wall clock.
    pub sent_at: jiff::Timestamp,
}

/// A performance sample describing how long a single upload took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadStat {
    /// Device that performed the upload.
    pub device_id: DeviceId,
    /// Device-reported send time.
    pub sent_at: jiff::Timestamp,
    /// Upload duration in nanoseconds.
    pub upload_time: u64,
}

/// Health metrics derived for a single device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMetrics {
    /// Estimated availability between 0 and 100 inclusive.
    pub uptime: f64,
    /// Mean upload duration, e.g. `5m10.123456789s`.
    pub avg_upload_time: String,
}

/// Raw event counts stored for a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCounts {
    pub device_id: DeviceId,
    pub heartbeat_count: u64,
    pub stats_count: u64,
}
