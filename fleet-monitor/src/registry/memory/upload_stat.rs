use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use fleet_core::{DeviceId, UploadStat};
use tokio::sync::RwLock;

use crate::registry::UploadStatRegistry;

#[derive(Clone, Default)]
pub struct InMemoryUploadStatRegistry {
    pub stats: Arc<RwLock<HashMap<DeviceId, Vec<UploadStat>>>>,
}

impl InMemoryUploadStatRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UploadStatRegistry for InMemoryUploadStatRegistry {
    type Error = Infallible;

    async fn store(&self, stat: UploadStat) -> Result<(), Self::Error> {
        self.stats
            .write()
            .await
            .entry(stat.device_id.clone())
            .or_default()
            .push(stat);

        Ok(())
    }

    async fn average_upload_time(&self, id: &DeviceId) -> Result<Option<f64>, Self::Error> {
        let stats = self.stats.read().await;

        let Some(samples) = stats.get(id).filter(|samples| !samples.is_empty()) else {
            return Ok(None);
        };

        let total: u128 = samples.iter().map(|s| u128::from(s.upload_time)).sum();

        Ok(Some(total as f64 / samples.len() as f64))
    }

    async fn count(&self, id: &DeviceId) -> Result<u64, Self::Error> {
        Ok(self
            .stats
            .read()
            .await
            .get(id)
            .map_or(0, |samples| samples.len() as u64))
    }
}
