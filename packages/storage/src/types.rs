// ABOUTME: Type definitions for stored setting records
// ABOUTME: Record shape, provenance marker and label helpers

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Where a record's value came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingSource {
    /// Written through the store (manual edit or left empty)
    #[default]
    #[serde(rename = "")]
    Stored,
    /// Supplied by an environment override
    #[serde(rename = "env")]
    Env,
}

impl SettingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingSource::Stored => "",
            SettingSource::Env => "env",
        }
    }
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingSource {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(SettingSource::Stored),
            "env" => Ok(SettingSource::Env),
            other => Err(StorageError::Database(format!(
                "Unknown setting source: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub name: String,
    pub value: String,
    pub default: String,
    #[serde(default)]
    pub source: SettingSource,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Compared on update; bumped by the store on every successful write.
    #[serde(default)]
    pub resource_version: i64,
}

impl StoredRecord {
    pub fn new(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
            ..Self::default()
        }
    }

    /// Value callers should act on: the stored value, or the default when empty.
    pub fn effective_value(&self) -> &str {
        if self.value.is_empty() {
            &self.default
        } else {
            &self.value
        }
    }
}
