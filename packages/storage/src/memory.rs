// ABOUTME: In-process setting store
// ABOUTME: Same optimistic concurrency rules as the database store, kept in a map

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{SettingStore, StorageError, StorageResult, StoredRecord};

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, StoredRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with records as-is, keeping their versions (at least 1).
    pub fn with_records(records: impl IntoIterator<Item = StoredRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|mut record| {
                record.resource_version = record.resource_version.max(1);
                (record.name.clone(), record)
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl SettingStore for MemoryStore {
    async fn get(&self, name: &str) -> StorageResult<StoredRecord> {
        self.records
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    async fn create(&self, mut record: StoredRecord) -> StorageResult<StoredRecord> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.name) {
            return Err(StorageError::AlreadyExists(record.name));
        }

        record.resource_version = 1;
        records.insert(record.name.clone(), record.clone());
        Ok(record)
    }

    async fn update(&self, mut record: StoredRecord) -> StorageResult<StoredRecord> {
        let mut records = self.records.write().await;
        let current = records
            .get(&record.name)
            .ok_or_else(|| StorageError::NotFound(record.name.clone()))?;

        if current.resource_version != record.resource_version {
            return Err(StorageError::Conflict(record.name));
        }

        record.resource_version += 1;
        records.insert(record.name.clone(), record.clone());
        Ok(record)
    }

    async fn list(&self) -> StorageResult<Vec<StoredRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }
}
