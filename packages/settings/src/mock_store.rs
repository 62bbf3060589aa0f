use async_trait::async_trait;
use keel_storage::{SettingStore, StorageResult, StoredRecord};
use mockall::mock;

mock! {
    pub Store {}

    #[async_trait]
    impl SettingStore for Store {
        async fn get(&self, name: &str) -> StorageResult<StoredRecord>;
        async fn create(&self, record: StoredRecord) -> StorageResult<StoredRecord>;
        async fn update(&self, record: StoredRecord) -> StorageResult<StoredRecord>;
        async fn list(&self) -> StorageResult<Vec<StoredRecord>>;
    }
}
