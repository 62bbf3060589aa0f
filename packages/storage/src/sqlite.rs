// ABOUTME: SQLite-backed setting store
// ABOUTME: Compare-and-swap updates on resource_version for multi-node writers

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use crate::{SettingSource, SettingStore, StorageError, StorageResult, StoredRecord};

const SELECT_COLUMNS: &str =
    "SELECT name, value, default_value, source, labels, resource_version FROM settings";

#[derive(Debug, FromRow)]
struct SettingRow {
    name: String,
    value: String,
    default_value: String,
    source: String,
    labels: String,
    resource_version: i64,
}

impl TryFrom<SettingRow> for StoredRecord {
    type Error = StorageError;

    fn try_from(row: SettingRow) -> Result<Self, Self::Error> {
        let labels: BTreeMap<String, String> = serde_json::from_str(&row.labels)?;
        Ok(StoredRecord {
            name: row.name,
            value: row.value,
            default: row.default_value,
            source: SettingSource::from_str(&row.source)?,
            labels,
            resource_version: row.resource_version,
        })
    }
}

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `url` and apply migrations.
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Private in-memory database. Pinned to one connection that is never
    /// reaped; a replacement connection would open an empty database.
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(":memory:")?;
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM settings WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl SettingStore for SqliteStore {
    async fn get(&self, name: &str) -> StorageResult<StoredRecord> {
        let row = sqlx::query_as::<_, SettingRow>(&format!("{} WHERE name = ?", SELECT_COLUMNS))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row.try_into(),
            None => Err(StorageError::NotFound(name.to_string())),
        }
    }

    async fn create(&self, mut record: StoredRecord) -> StorageResult<StoredRecord> {
        let labels = serde_json::to_string(&record.labels)?;

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO settings
                (name, value, default_value, source, labels, resource_version)
            VALUES (?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(&record.name)
        .bind(&record.value)
        .bind(&record.default)
        .bind(record.source.as_str())
        .bind(&labels)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::AlreadyExists(record.name));
        }

        debug!("Inserted setting row {}", record.name);
        record.resource_version = 1;
        Ok(record)
    }

    async fn update(&self, mut record: StoredRecord) -> StorageResult<StoredRecord> {
        let labels = serde_json::to_string(&record.labels)?;

        let result = sqlx::query(
            r#"
            UPDATE settings
            SET value = ?, default_value = ?, source = ?, labels = ?,
                resource_version = resource_version + 1,
                updated_at = datetime('now', 'utc')
            WHERE name = ? AND resource_version = ?
            "#,
        )
        .bind(&record.value)
        .bind(&record.default)
        .bind(record.source.as_str())
        .bind(&labels)
        .bind(&record.name)
        .bind(record.resource_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return if self.exists(&record.name).await? {
                Err(StorageError::Conflict(record.name))
            } else {
                Err(StorageError::NotFound(record.name))
            };
        }

        record.resource_version += 1;
        Ok(record)
    }

    async fn list(&self) -> StorageResult<Vec<StoredRecord>> {
        let rows = sqlx::query_as::<_, SettingRow>(&format!("{} ORDER BY name", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(StoredRecord::try_from).collect()
    }
}
