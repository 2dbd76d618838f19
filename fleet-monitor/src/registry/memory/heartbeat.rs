use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use fleet_core::{DeviceId, Heartbeat};
use jiff::Timestamp;
use tokio::sync::RwLock;

use crate::registry::HeartbeatRegistry;

#[derive(Clone, Default)]
pub struct InMemoryHeartbeatRegistry {
    pub heartbeats: Arc<RwLock<HashMap<DeviceId, Vec<Timestamp>>>>,
}

impl InMemoryHeartbeatRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HeartbeatRegistry for InMemoryHeartbeatRegistry {
    type Error = Infallible;

    async fn store(&self, heartbeat: Heartbeat) -> Result<(), Self::Error> {
        self.heartbeats
            .write()
            .await
            .entry(heartbeat.device_id)
            .or_default()
            .push(heartbeat.sent_at);

        Ok(())
    }

    async fn distinct_timestamps(&self, id: &DeviceId) -> Result<Vec<Timestamp>, Self::Error> {
        let mut timestamps = self
            .heartbeats
            .read()
            .await
            .get(id)
            .cloned()
            .unwrap_or_default();

        timestamps.sort_unstable();
        timestamps.dedup();

        Ok(timestamps)
    }

    async fn count(&self, id: &DeviceId) -> Result<u64, Self::Error> {
        Ok(self
            .heartbeats
            .read()
            .await
            .get(id)
            .map_or(0, |timestamps| timestamps.len() as u64))
    }
}
