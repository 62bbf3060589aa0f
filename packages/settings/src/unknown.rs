// ABOUTME: Labels stored settings the running binary does not declare
// ABOUTME: Retries on write conflicts since peers may be touching the same records

use keel_storage::StoredRecord;
use tracing::{debug, info, warn};

use crate::error::{SettingsError, SettingsResult};
use crate::provider::SettingsProvider;
use crate::types::SettingMap;

/// Label key marking a record as unknown to this binary
pub const UNKNOWN_SETTING_LABEL: &str = "keel.io/unknown";
pub const UNKNOWN_SETTING_LABEL_VALUE: &str = "true";

impl SettingsProvider {
    pub(crate) async fn label_unknown_settings(&self, desired: &SettingMap) -> SettingsResult<()> {
        let records = self.store.list().await?;

        for record in records {
            if desired.contains_key(&record.name)
                || record.labels.contains_key(UNKNOWN_SETTING_LABEL)
            {
                continue;
            }
            self.label_unknown(record).await?;
        }

        Ok(())
    }

    /// Re-fetch, relabel and retry on conflict, up to `label_retry_attempts` writes.
    async fn label_unknown(&self, mut record: StoredRecord) -> SettingsResult<()> {
        let name = record.name.clone();
        let mut attempt = 0;

        loop {
            attempt += 1;
            record.labels.insert(
                UNKNOWN_SETTING_LABEL.to_string(),
                UNKNOWN_SETTING_LABEL_VALUE.to_string(),
            );

            match self.store.update(record).await {
                Ok(_) => {
                    info!("Labeled setting {} as unknown", name);
                    return Ok(());
                }
                Err(err) if err.is_conflict() && attempt < self.label_retry_attempts => {
                    warn!(
                        "Conflict labeling setting {} as unknown (attempt {}/{}), retrying",
                        name, attempt, self.label_retry_attempts
                    );
                    record = match self.store.get(&name).await {
                        Ok(current) => current,
                        Err(err) if err.is_not_found() => {
                            debug!("Setting {} was removed before it could be labeled", name);
                            return Ok(());
                        }
                        Err(err) => return Err(err.into()),
                    };
                    if record.labels.contains_key(UNKNOWN_SETTING_LABEL) {
                        debug!("Setting {} was labeled by another writer", name);
                        return Ok(());
                    }
                }
                Err(err) if err.is_conflict() => {
                    return Err(SettingsError::LabelRetriesExhausted {
                        name,
                        attempts: attempt,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_store::MockStore;
    use keel_config::StaticEnv;
    use keel_storage::StorageError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn unknown_record() -> StoredRecord {
        StoredRecord {
            value: "unknown".to_string(),
            resource_version: 1,
            ..StoredRecord::new("unknown", "unknown")
        }
    }

    fn provider(store: MockStore) -> SettingsProvider {
        SettingsProvider::new(Arc::new(store), Arc::new(StaticEnv::new()))
    }

    #[tokio::test]
    async fn test_conflict_is_retried_once() {
        let mut store = MockStore::new();
        store
            .expect_list()
            .times(1)
            .returning(|| Ok(vec![unknown_record()]));
        store
            .expect_get()
            .times(1)
            .withf(|name: &str| name == "unknown")
            .returning(|_| {
                Ok(StoredRecord {
                    resource_version: 2,
                    ..unknown_record()
                })
            });

        let updates = Arc::new(AtomicUsize::new(0));
        let seen = updates.clone();
        store.expect_update().times(2).returning(move |record| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(StorageError::Conflict(record.name));
            }
            assert_eq!(record.resource_version, 2);
            assert_eq!(record.value, "unknown");
            assert_eq!(
                record.labels.get(UNKNOWN_SETTING_LABEL).map(String::as_str),
                Some("true")
            );
            Ok(record)
        });

        provider(store).set_all(&HashMap::new()).await.unwrap();
        assert_eq!(updates.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_retry_cap() {
        let mut store = MockStore::new();
        store.expect_list().returning(|| Ok(vec![unknown_record()]));
        store.expect_get().times(2).returning(|_| Ok(unknown_record()));
        store
            .expect_update()
            .times(3)
            .returning(|record| Err(StorageError::Conflict(record.name)));

        let provider = provider(store).with_label_retry_attempts(3);
        let err = provider.set_all(&HashMap::new()).await.unwrap_err();

        assert!(matches!(
            err,
            SettingsError::LabelRetriesExhausted { ref name, attempts: 3 } if name == "unknown"
        ));
    }

    #[tokio::test]
    async fn test_stops_when_peer_already_labeled() {
        let mut store = MockStore::new();
        store.expect_list().returning(|| Ok(vec![unknown_record()]));
        store
            .expect_update()
            .times(1)
            .returning(|record| Err(StorageError::Conflict(record.name)));
        store.expect_get().times(1).returning(|_| {
            let mut record = unknown_record();
            record
                .labels
                .insert(UNKNOWN_SETTING_LABEL.to_string(), "true".to_string());
            Ok(record)
        });

        provider(store).set_all(&HashMap::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_stops_when_record_removed() {
        let mut store = MockStore::new();
        store.expect_list().returning(|| Ok(vec![unknown_record()]));
        store
            .expect_update()
            .times(1)
            .returning(|record| Err(StorageError::Conflict(record.name)));
        store
            .expect_get()
            .times(1)
            .returning(|name| Err(StorageError::NotFound(name.to_string())));

        provider(store).set_all(&HashMap::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_conflict_failure_aborts() {
        let mut store = MockStore::new();
        store.expect_list().returning(|| Ok(vec![unknown_record()]));
        store
            .expect_update()
            .times(1)
            .returning(|_| Err(StorageError::Unavailable("some error".to_string())));
        store.expect_get().never();

        assert!(provider(store).set_all(&HashMap::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_record_removed_before_first_label_write_aborts() {
        let mut store = MockStore::new();
        store.expect_list().returning(|| Ok(vec![unknown_record()]));
        store
            .expect_update()
            .times(1)
            .returning(|record| Err(StorageError::NotFound(record.name)));
        store.expect_get().never();

        let err = provider(store).set_all(&HashMap::new()).await.unwrap_err();
        assert!(matches!(err, SettingsError::Storage(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_already_labeled_records_are_skipped() {
        let mut labeled = unknown_record();
        labeled
            .labels
            .insert(UNKNOWN_SETTING_LABEL.to_string(), "true".to_string());

        let mut store = MockStore::new();
        store
            .expect_list()
            .returning(move || Ok(vec![labeled.clone()]));
        store.expect_update().never();

        provider(store).set_all(&HashMap::new()).await.unwrap();
    }
}
