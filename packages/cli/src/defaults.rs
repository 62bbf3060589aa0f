// ABOUTME: Loads the desired settings file
// ABOUTME: A flat JSON object mapping setting names to their defaults

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use keel_config::env_key;
use keel_settings::{setting_map, Setting, SettingMap};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DefaultsError {
    #[error("Failed to read defaults file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Defaults file is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Setting names cannot be empty")]
    EmptyName,
    #[error("Settings '{first}' and '{second}' share the override variable suffix {key}")]
    OverrideKeyCollision {
        first: String,
        second: String,
        key: String,
    },
}

pub fn parse_defaults(content: &str) -> Result<SettingMap, DefaultsError> {
    let entries: BTreeMap<String, String> = serde_json::from_str(content)?;

    if entries.keys().any(|name| name.trim().is_empty()) {
        return Err(DefaultsError::EmptyName);
    }

    // Override keys are prefix + normalized name, so a clash is prefix independent
    let mut keys: HashMap<String, &str> = HashMap::new();
    for name in entries.keys() {
        let key = env_key("", name);
        if let Some(first) = keys.insert(key.clone(), name) {
            return Err(DefaultsError::OverrideKeyCollision {
                first: first.to_string(),
                second: name.clone(),
                key,
            });
        }
    }

    Ok(setting_map(
        entries
            .into_iter()
            .map(|(name, default)| Setting::new(name, default)),
    ))
}

pub fn load_defaults(path: &Path) -> Result<SettingMap, DefaultsError> {
    let content = std::fs::read_to_string(path)?;
    parse_defaults(&content)
}
