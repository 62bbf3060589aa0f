// ABOUTME: Reconciles desired settings with records in the shared store
// ABOUTME: Resolves env precedence and maintains the fallback cache

use std::sync::Arc;

use keel_config::constants::DEFAULT_LABEL_RETRY_ATTEMPTS;
use keel_config::{EnvResolver, ProcessEnv, ReconcileConfig};
use keel_storage::{SettingSource, SettingStore, StoredRecord};
use tracing::{debug, info, warn};

use crate::error::{SettingsError, SettingsResult};
use crate::fallback::FallbackCache;
use crate::types::{Setting, SettingMap};

/// Record for a name the store has never seen.
pub(crate) fn new_record(name: &str, setting: &Setting, env_value: Option<String>) -> StoredRecord {
    let mut record = StoredRecord::new(name, setting.default.clone());
    if let Some(value) = env_value {
        record.value = value;
        record.source = SettingSource::Env;
    }
    record
}

/// Bring an existing record in line with the desired setting.
///
/// The default is always replaced. An override (even an empty one) replaces
/// value and source; without one the stored value and source are kept.
pub(crate) fn apply_desired(
    mut record: StoredRecord,
    setting: &Setting,
    env_value: Option<String>,
) -> StoredRecord {
    record.default = setting.default.clone();
    if let Some(value) = env_value {
        record.value = value;
        record.source = SettingSource::Env;
    }
    record
}

pub struct SettingsProvider {
    pub(crate) store: Arc<dyn SettingStore>,
    env: Arc<dyn EnvResolver>,
    fallback: FallbackCache,
    pub(crate) label_retry_attempts: u32,
}

impl SettingsProvider {
    pub fn new(store: Arc<dyn SettingStore>, env: Arc<dyn EnvResolver>) -> Self {
        Self {
            store,
            env,
            fallback: FallbackCache::new(),
            label_retry_attempts: DEFAULT_LABEL_RETRY_ATTEMPTS,
        }
    }

    /// Provider reading overrides from the process environment.
    pub fn from_config(store: Arc<dyn SettingStore>, config: &ReconcileConfig) -> Self {
        Self::new(store, Arc::new(ProcessEnv::new(config.env_prefix.clone())))
            .with_label_retry_attempts(config.label_retry_attempts)
    }

    pub fn with_label_retry_attempts(mut self, attempts: u32) -> Self {
        self.label_retry_attempts = attempts.max(1);
        self
    }

    pub fn fallback(&self) -> &FallbackCache {
        &self.fallback
    }

    /// Converge the store to `desired`, then label records it doesn't name.
    ///
    /// Stops at the first unrecoverable error; records already written stay
    /// written. Safe to call again after a failure.
    pub async fn set_all(&self, desired: &SettingMap) -> SettingsResult<()> {
        info!("Reconciling {} desired settings", desired.len());

        for (name, setting) in desired {
            self.reconcile_setting(name, setting).await?;
        }

        self.label_unknown_settings(desired).await
    }

    async fn reconcile_setting(&self, name: &str, setting: &Setting) -> SettingsResult<()> {
        let env_value = self.env.lookup(name);
        if env_value.is_some() {
            debug!("Setting {} has an environment override", name);
        }

        let record = match self.store.get(name).await {
            Ok(existing) => {
                let updated = apply_desired(existing, setting, env_value);
                self.store.update(updated).await?
            }
            Err(err) if err.is_not_found() => {
                let record = new_record(name, setting, env_value);
                match self.store.create(record.clone()).await {
                    Ok(created) => {
                        info!("Created setting {}", name);
                        created
                    }
                    // Another node won the race; its record matches ours.
                    Err(err) if err.is_already_exists() => {
                        debug!("Setting {} was created concurrently, skipping", name);
                        record
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Err(err) => return Err(err.into()),
        };

        self.fallback.insert(name, record.effective_value()).await;
        Ok(())
    }

    /// Effective value for `name`.
    ///
    /// A non-empty override wins, then the stored record, then the fallback
    /// cache if the store can't be read.
    pub async fn get(&self, name: &str) -> Option<String> {
        if let Some(value) = self.env.lookup(name).filter(|v| !v.is_empty()) {
            return Some(value);
        }

        match self.store.get(name).await {
            Ok(record) => Some(record.effective_value().to_string()),
            Err(err) => {
                if !err.is_not_found() {
                    warn!("Reading setting {} failed, using fallback: {}", name, err);
                }
                self.fallback.get(name).await
            }
        }
    }

    /// Store a user-supplied value. Refused while an override is present.
    pub async fn set(&self, name: &str, value: &str) -> SettingsResult<StoredRecord> {
        self.ensure_not_overridden(name)?;
        let record = self.store.get(name).await?;
        self.write_value(record, value).await
    }

    /// Like [`set`](Self::set), but leaves a non-empty stored value alone.
    pub async fn set_if_unset(&self, name: &str, value: &str) -> SettingsResult<StoredRecord> {
        self.ensure_not_overridden(name)?;
        let record = self.store.get(name).await?;
        if !record.value.is_empty() {
            return Ok(record);
        }
        self.write_value(record, value).await
    }

    fn ensure_not_overridden(&self, name: &str) -> SettingsResult<()> {
        if self.env.lookup(name).is_some() {
            return Err(SettingsError::EnvOverride(name.to_string()));
        }
        Ok(())
    }

    async fn write_value(
        &self,
        mut record: StoredRecord,
        value: &str,
    ) -> SettingsResult<StoredRecord> {
        record.value = value.to_string();
        record.source = SettingSource::Stored;

        let record = self.store.update(record).await?;
        self.fallback
            .insert(&record.name, record.effective_value())
            .await;
        info!("Updated value of setting {}", record.name);
        Ok(record)
    }
}
