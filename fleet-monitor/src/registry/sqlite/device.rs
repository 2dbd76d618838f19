use async_trait::async_trait;
use fleet_core::DeviceId;
use sqlx::{Row, SqlitePool};

use crate::registry::DeviceRegistry;

use super::SqliteError;

#[derive(Clone)]
pub struct SqliteDeviceRegistry {
    pool: SqlitePool,
}

impl SqliteDeviceRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceRegistry for SqliteDeviceRegistry {
    type Error = SqliteError;

    async fn exists(&self, id: &DeviceId) -> Result<bool, Self::Error> {
        let row = sqlx::query(r#"SELECT 1 FROM devices WHERE device_id = ?"#)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn list(&self) -> Result<Vec<DeviceId>, Self::Error> {
        let rows = sqlx::query(r#"SELECT device_id FROM devices ORDER BY device_id ASC"#)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<DeviceId, SqliteError> {
                Ok(DeviceId::from(row.try_get::<String, _>("device_id")?))
            })
            .collect()
    }

    async fn batch_register(&self, ids: Vec<DeviceId>) -> Result<(), Self::Error> {
        let mut tx = self.pool.begin().await?;

        for id in &ids {
            sqlx::query(r#"INSERT OR IGNORE INTO devices (device_id) VALUES (?)"#)
                .bind(id.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
