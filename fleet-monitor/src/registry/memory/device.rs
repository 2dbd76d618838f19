use std::collections::BTreeSet;
use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use fleet_core::DeviceId;
use tokio::sync::RwLock;

use crate::registry::DeviceRegistry;

#[derive(Clone, Default)]
pub struct InMemoryDeviceRegistry {
    pub devices: Arc<RwLock<BTreeSet<DeviceId>>>,
}

impl InMemoryDeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeviceRegistry for InMemoryDeviceRegistry {
    type Error = Infallible;

    async fn exists(&self, id: &DeviceId) -> Result<bool, Self::Error> {
        Ok(self.devices.read().await.contains(id))
    }

    async fn list(&self) -> Result<Vec<DeviceId>, Self::Error> {
        Ok(self.devices.read().await.iter().cloned().collect())
    }

    async fn batch_register(&self, ids: Vec<DeviceId>) -> Result<(), Self::Error> {
        self.devices.write().await.extend(ids);
        Ok(())
    }
}
