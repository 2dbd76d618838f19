mod device;
mod heartbeat;
mod upload_stat;

pub use device::SqliteDeviceRegistry;
pub use heartbeat::SqliteHeartbeatRegistry;
pub use upload_stat::SqliteUploadStatRegistry;

use std::path::Path;

use jiff::Timestamp;
use sqlx::{
    SqlitePool,
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Shared error type for all SQLite registry implementations.
#[derive(Debug, thiserror::Error)]
pub enum SqliteError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("invalid timestamp: {secs}s {nanos}ns")]
    InvalidTimestamp { secs: i64, nanos: i32 },
    #[error("upload time out of storable range: {0}")]
    UploadTimeOutOfRange(u64),
}

/// Opens (creating if missing) the database at `path` and applies pending
/// migrations. The returned pool is meant to be shared by every registry.
pub async fn connect(path: impl AsRef<Path>) -> Result<SqlitePool, SqliteError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

/// A private in-memory database. Limited to one connection that is never
/// recycled, since every SQLite connection gets its own `:memory:` database.
#[cfg(test)]
pub async fn connect_in_memory() -> Result<SqlitePool, SqliteError> {
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await?;

    Ok(pool)
}

/// Splits a timestamp into whole seconds and a signed sub-second part. Both
/// carry the same sign, so ordering by `(secs, nanos)` is chronological.
fn encode_timestamp(ts: Timestamp) -> (i64, i32) {
    (ts.as_second(), ts.subsec_nanosecond())
}

fn decode_timestamp(secs: i64, nanos: i32) -> Result<Timestamp, SqliteError> {
    Timestamp::new(secs, nanos).map_err(|_| SqliteError::InvalidTimestamp { secs, nanos })
}
