use async_trait::async_trait;
use fleet_core::{DeviceId, UploadStat};
use sqlx::{Row, SqlitePool};

use crate::registry::UploadStatRegistry;

use super::{SqliteError, encode_timestamp};

#[derive(Clone)]
pub struct SqliteUploadStatRegistry {
    pool: SqlitePool,
}

impl SqliteUploadStatRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadStatRegistry for SqliteUploadStatRegistry {
    type Error = SqliteError;

    async fn store(&self, stat: UploadStat) -> Result<(), Self::Error> {
        let upload_time = i64::try_from(stat.upload_time)
            .map_err(|_| SqliteError::UploadTimeOutOfRange(stat.upload_time))?;

        let (secs, nanos) = encode_timestamp(stat.sent_at);

        sqlx::query(
            r#"INSERT INTO stats (device_id, sent_at_secs, sent_at_nanos, upload_time) VALUES (?, ?, ?, ?)"#,
        )
        .bind(stat.device_id.as_str())
        .bind(secs)
        .bind(nanos)
        .bind(upload_time)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn average_upload_time(&self, id: &DeviceId) -> Result<Option<f64>, Self::Error> {
        let average: Option<f64> = sqlx::query(
            r#"SELECT AVG(upload_time) AS avg_upload_time FROM stats WHERE device_id = ?"#,
        )
        .bind(id.as_str())
        .fetch_one(&self.pool)
        .await?
        .try_get("avg_upload_time")?;

        Ok(average)
    }

    async fn count(&self, id: &DeviceId) -> Result<u64, Self::Error> {
        let count: i64 = sqlx::query(r#"SELECT COUNT(*) FROM stats WHERE device_id = ?"#)
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;

        Ok(count as u64)
    }
}
