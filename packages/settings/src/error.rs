use keel_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Gave up labeling unknown setting {name} after {attempts} conflicting updates")]
    LabelRetriesExhausted { name: String, attempts: u32 },

    #[error("Setting {0} is controlled by an environment override")]
    EnvOverride(String),
}

pub type SettingsResult<T> = Result<T, SettingsError>;
