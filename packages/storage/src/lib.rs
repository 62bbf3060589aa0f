// ABOUTME: Data layer for setting records shared across nodes
// ABOUTME: Store contract plus in-memory and SQLite implementations

use async_trait::async_trait;

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{SettingSource, StoredRecord};

/// Contract every setting store implements.
///
/// Writers race each other, so implementations must report:
/// - `NotFound` from `get`/`update` when the name is absent
/// - `AlreadyExists` from `create` when another writer created the name first
/// - `Conflict` from `update` when `resource_version` is stale
#[async_trait]
pub trait SettingStore: Send + Sync {
    async fn get(&self, name: &str) -> StorageResult<StoredRecord>;
    async fn create(&self, record: StoredRecord) -> StorageResult<StoredRecord>;
    async fn update(&self, record: StoredRecord) -> StorageResult<StoredRecord>;
    async fn list(&self) -> StorageResult<Vec<StoredRecord>>;
}
