// ABOUTME: Type definitions for desired settings
// ABOUTME: What the running binary expects the store to contain

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A setting the running binary knows about, with its current default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub name: String,
    pub default: String,
}

impl Setting {
    pub fn new(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
        }
    }
}

/// Desired settings keyed by name
pub type SettingMap = HashMap<String, Setting>;

/// Build a [`SettingMap`] keyed by each setting's own name.
pub fn setting_map(settings: impl IntoIterator<Item = Setting>) -> SettingMap {
    settings
        .into_iter()
        .map(|setting| (setting.name.clone(), setting))
        .collect()
}
