use async_trait::async_trait;
use fleet_core::{DeviceId, Heartbeat};
use jiff::Timestamp;
use sqlx::{Row, SqlitePool};

use crate::registry::HeartbeatRegistry;

use super::{SqliteError, decode_timestamp, encode_timestamp};

#[derive(Clone)]
pub struct SqliteHeartbeatRegistry {
    pool: SqlitePool,
}

impl SqliteHeartbeatRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HeartbeatRegistry for SqliteHeartbeatRegistry {
    type Error = SqliteError;

    async fn store(&self, heartbeat: Heartbeat) -> Result<(), Self::Error> {
        let (secs, nanos) = encode_timestamp(heartbeat.sent_at);

        sqlx::query(
            r#"INSERT INTO heartbeats (device_id, sent_at_secs, sent_at_nanos) VALUES (?, ?, ?)"#,
        )
        .bind(heartbeat.device_id.as_str())
        .bind(secs)
        .bind(nanos)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn distinct_timestamps(&self, id: &DeviceId) -> Result<Vec<Timestamp>, Self::Error> {
        let rows = sqlx::query(
            r#"
            SELECT DISTINCT sent_at_secs, sent_at_nanos FROM heartbeats
            WHERE device_id = ?
            ORDER BY sent_at_secs ASC, sent_at_nanos ASC
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Timestamp, SqliteError> {
                decode_timestamp(row.try_get("sent_at_secs")?, row.try_get("sent_at_nanos")?)
            })
            .collect()
    }

    async fn count(&self, id: &DeviceId) -> Result<u64, Self::Error> {
        let count: i64 = sqlx::query(r#"SELECT COUNT(*) FROM heartbeats WHERE device_id = ?"#)
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;

        Ok(count as u64)
    }
}
