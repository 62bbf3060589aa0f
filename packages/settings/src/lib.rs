// ABOUTME: Settings reconciliation for nodes sharing one store
// ABOUTME: Desired settings, the provider that converges them and the fallback cache

pub mod error;
pub mod fallback;
pub mod provider;
pub mod types;
pub mod unknown;

#[cfg(test)]
mod mock_store;

pub use error::{SettingsError, SettingsResult};
pub use fallback::FallbackCache;
pub use provider::SettingsProvider;
pub use types::{setting_map, Setting, SettingMap};
pub use unknown::{UNKNOWN_SETTING_LABEL, UNKNOWN_SETTING_LABEL_VALUE};
