//! Health metrics derived from a device's stored telemetry.
//!
//! Uptime is a density estimate: the number of distinct heartbeats seen is
//! compared against the number expected at a nominal reporting cadence over
//! the observed window. It does not look for individual gaps.

use fleet_core::{DeviceId, DeviceMetrics, format_duration_nanos};
use jiff::{SignedDuration, Timestamp};
use tracing::debug;

use crate::AppState;
use crate::error::TelemetryError;
use crate::registry::{DeviceRegistry, HeartbeatRegistry, UploadStatRegistry};

/// Nominal cadence a healthy device reports heartbeats at.
pub const EXPECTED_HEARTBEAT_INTERVAL: SignedDuration = SignedDuration::from_secs(60);

/// Ceiling for reported uptime; devices reporting faster than the nominal
/// cadence are clamped to it.
pub const MAX_UPTIME: f64 = 100.0;

/// Uptime percentage for a set of heartbeat send times, in `[0, 100]`.
///
/// Input order and duplicates do not matter. Fewer than two distinct
/// timestamps give `0.0`.
pub fn uptime_percentage(timestamps: &[Timestamp]) -> f64 {
    let mut timestamps = timestamps.to_vec();
    timestamps.sort_unstable();
    timestamps.dedup();

    if timestamps.len() < 2 {
        return 0.0;
    }

    let (first, last) = (timestamps[0], timestamps[timestamps.len() - 1]);
    let window = last.duration_since(first).as_secs_f64();
    let expected = window / EXPECTED_HEARTBEAT_INTERVAL.as_secs_f64();
    if expected <= 0.0 {
        return MAX_UPTIME;
    }

    let uptime = (timestamps.len() as f64 / expected) * 100.0;
    uptime.min(MAX_UPTIME)
}

pub async fn uptime<H>(heartbeats: &H, id: &DeviceId) -> Result<f64, H::Error>
where
    H: HeartbeatRegistry,
{
    let timestamps = heartbeats.distinct_timestamps(id).await?;
    Ok(uptime_percentage(&timestamps))
}

/// Mean upload duration for the device rendered like `5m10.123456789s`;
/// `0s` when it has no samples.
pub async fn avg_upload_duration<U>(stats: &U, id: &DeviceId) -> Result<String, U::Error>
where
    U: UploadStatRegistry,
{
    let average = stats.average_upload_time(id).await?;
    Ok(average.map_or_else(|| "0s".to_owned(), format_duration_nanos))
}

impl<Dev, H, U> AppState<Dev, H, U>
where
    Dev: DeviceRegistry,
    H: HeartbeatRegistry,
    U: UploadStatRegistry,
{
    pub async fn device_metrics(&self, id: &DeviceId) -> Result<DeviceMetrics, TelemetryError> {
        self.ensure_known(id).await?;

        let uptime = uptime(&self.heartbeat_registry, id)
            .await
            .map_err(TelemetryError::store)?;
        let avg_upload_time = avg_upload_duration(&self.upload_stat_registry, id)
            .await
            .map_err(TelemetryError::store)?;

        debug!(device_id = %id, uptime, avg_upload_time = %avg_upload_time, "metrics computed");

        Ok(DeviceMetrics {
            uptime,
            avg_upload_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use fleet_core::{DeviceId, Heartbeat, UploadStat};
    use jiff::{SignedDuration, Timestamp};

    use crate::AppState;
    use crate::error::TelemetryError;
    use crate::registry::memory::{
        InMemoryDeviceRegistry, InMemoryHeartbeatRegistry, InMemoryUploadStatRegistry,
    };
    use crate::registry::{DeviceRegistry, HeartbeatRegistry, UploadStatRegistry};

    use super::{avg_upload_duration, uptime, uptime_percentage};

    fn base() -> Timestamp {
        "2024-05-01T12:00:00Z".parse().unwrap()
    }

    fn minutes(offsets: &[i64]) -> Vec<Timestamp> {
        offsets
            .iter()
            .map(|m| base() + SignedDuration::from_secs(m * 60))
            .collect()
    }

    #[test]
    fn test_no_or_single_heartbeat_is_zero() {
        assert_eq!(uptime_percentage(&[]), 0.0);
        assert_eq!(uptime_percentage(&minutes(&[0])), 0.0);
        assert_eq!(uptime_percentage(&minutes(&[3, 3, 3])), 0.0);
    }

    #[test]
    fn test_one_per_minute_is_fully_up() {
        let timestamps = minutes(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(uptime_percentage(&timestamps), 100.0);
    }

    #[test]
    fn test_sparse_reporting_lowers_uptime() {
        // 3 heartbeats across a 4 minute window
        assert_eq!(uptime_percentage(&minutes(&[0, 2, 4])), 75.0);
        // 2 heartbeats across a 10 minute window
        assert_eq!(uptime_percentage(&minutes(&[0, 10])), 20.0);
    }

    #[test]
    fn test_fast_reporting_is_clamped() {
        let timestamps: Vec<Timestamp> = (0..10)
            .map(|s| base() + SignedDuration::from_secs(s))
            .collect();
        assert_eq!(uptime_percentage(&timestamps), 100.0);
    }

    #[test]
    fn test_order_and_duplicates_do_not_matter() {
        let ordered = minutes(&[0, 1, 3, 7, 8]);
        let shuffled = minutes(&[8, 0, 7, 7, 3, 1, 0]);
        assert_eq!(uptime_percentage(&ordered), uptime_percentage(&shuffled));
    }

    #[test]
    fn test_uptime_stays_in_range() {
        for gap in 1..120 {
            let timestamps = minutes(&[0, gap, gap * 2]);
            let uptime = uptime_percentage(&timestamps);
            assert!((0.0..=100.0).contains(&uptime), "gap {gap}: {uptime}");
        }
    }

    type MemoryState =
        AppState<InMemoryDeviceRegistry, InMemoryHeartbeatRegistry, InMemoryUploadStatRegistry>;

    async fn state() -> MemoryState {
        let state = AppState::new(
            InMemoryDeviceRegistry::new(),
            InMemoryHeartbeatRegistry::new(),
            InMemoryUploadStatRegistry::new(),
        );
        state
            .device_registry
            .batch_register(vec![DeviceId::from("dev-1")])
            .await
            .unwrap();
        state
    }

    #[tokio::test]
    async fn test_uptime_from_out_of_order_arrivals() {
        let state = state().await;
        let id = DeviceId::from("dev-1");

        for sent_at in minutes(&[4, 0, 2, 1, 3]) {
            state
                .heartbeat_registry
                .store(Heartbeat {
                    device_id: id.clone(),
                    sent_at,
                })
                .await
                .unwrap();
        }

        assert_eq!(uptime(&state.heartbeat_registry, &id).await.unwrap(), 100.0);
    }

    #[tokio::test]
    async fn test_avg_upload_duration_without_samples() {
        let state = state().await;
        let id = DeviceId::from("dev-1");

        let avg = avg_upload_duration(&state.upload_stat_registry, &id)
            .await
            .unwrap();
        assert_eq!(avg, "0s");
    }

    #[tokio::test]
    async fn test_avg_upload_duration_is_mean_of_samples() {
        let state = state().await;
        let id = DeviceId::from("dev-1");

        for upload_time in [300_000_000_000, 320_246_913_578] {
            state
                .upload_stat_registry
                .store(UploadStat {
                    device_id: id.clone(),
                    sent_at: base(),
                    upload_time,
                })
                .await
                .unwrap();
        }

        let avg = avg_upload_duration(&state.upload_stat_registry, &id)
            .await
            .unwrap();
        assert_eq!(avg, "5m10.123456789s");
    }

    #[tokio::test]
    async fn test_device_metrics() {
        let state = state().await;
        let id = DeviceId::from("dev-1");

        for sent_at in minutes(&[0, 1, 2]) {
            state
                .submit_heartbeat(Heartbeat {
                    device_id: id.clone(),
                    sent_at,
                })
                .await
                .unwrap();
        }

        let metrics = state.device_metrics(&id).await.unwrap();
        assert_eq!(metrics.uptime, 100.0);
        assert_eq!(metrics.avg_upload_time, "0s");
    }

    #[tokio::test]
    async fn test_device_metrics_for_unknown_device() {
        let state = state().await;

        let result = state.device_metrics(&DeviceId::from("ghost")).await;
        assert!(matches!(result, Err(TelemetryError::DeviceNotFound(_))));
    }
}
