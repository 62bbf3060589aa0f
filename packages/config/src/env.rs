// ABOUTME: Environment override lookup for settings
// ABOUTME: Maps setting names to variable keys and resolves optional override values

use std::collections::HashMap;
use std::env;

use tracing::warn;

use crate::constants::{DEFAULT_ENV_PREFIX, RESERVED_ENV_VARS};

/// Build the override variable key for a setting name.
///
/// The name is upper-cased and `-`/`.` become `_`, so `server-url` with the
/// default prefix maps to `KEEL_SETTING_SERVER_URL`. The mapping is lossy:
/// `a-b`, `a.b` and `A_b` share one key.
pub fn env_key(prefix: &str, name: &str) -> String {
    let suffix: String = name
        .chars()
        .map(|c| match c {
            '-' | '.' => '_',
            other => other.to_ascii_uppercase(),
        })
        .collect();
    format!("{}{}", prefix, suffix)
}

/// Whether `key` is one of Keel's own configuration variables.
pub fn is_reserved_env_var(key: &str) -> bool {
    RESERVED_ENV_VARS.contains(&key)
}

/// Resolves an optional override value for a setting name.
///
/// `Some("")` is a real override and must stay distinguishable from `None`.
pub trait EnvResolver: Send + Sync {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads overrides from the process environment.
#[derive(Debug, Clone)]
pub struct ProcessEnv {
    prefix: String,
}

impl ProcessEnv {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for ProcessEnv {
    fn default() -> Self {
        Self::new(DEFAULT_ENV_PREFIX)
    }
}

impl EnvResolver for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        let key = env_key(&self.prefix, name);
        if is_reserved_env_var(&key) {
            warn!("Ignoring override {} for setting {}: reserved variable", key, name);
            return None;
        }
        match env::var(&key) {
            Ok(value) => Some(value),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => {
                warn!("Ignoring override {} for setting {}: not valid unicode", key, name);
                None
            }
        }
    }
}

/// Fixed set of overrides keyed by setting name.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    values: HashMap<String, String>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl FromIterator<(String, String)> for StaticEnv {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl EnvResolver for StaticEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{KEEL_DATABASE_URL, KEEL_LABEL_RETRY_ATTEMPTS, KEEL_LOG};
    use serial_test::serial;

    #[test]
    fn test_env_key_normalizes_name() {
        assert_eq!(env_key(DEFAULT_ENV_PREFIX, "server-url"), "KEEL_SETTING_SERVER_URL");
        assert_eq!(env_key(DEFAULT_ENV_PREFIX, "ui.brand"), "KEEL_SETTING_UI_BRAND");
        assert_eq!(env_key("APP_", "already_snake"), "APP_ALREADY_SNAKE");
    }

    #[test]
    fn test_static_env_distinguishes_empty_from_missing() {
        let env = StaticEnv::new().with("empty", "").with("set", "value");

        assert_eq!(env.lookup("empty"), Some(String::new()));
        assert_eq!(env.lookup("set"), Some("value".to_string()));
        assert_eq!(env.lookup("missing"), None);
    }

    #[test]
    #[serial]
    fn test_process_env_reads_prefixed_key() {
        let resolver = ProcessEnv::new("KEEL_TEST_");
        env::set_var("KEEL_TEST_FEATURE_FLAG", "");
        assert_eq!(resolver.lookup("feature-flag"), Some(String::new()));

        env::remove_var("KEEL_TEST_FEATURE_FLAG");
        assert_eq!(resolver.lookup("feature-flag"), None);
    }

    #[test]
    #[serial]
    fn test_default_prefix_does_not_read_config_vars() {
        env::set_var(KEEL_LOG, "debug");
        env::set_var(KEEL_DATABASE_URL, "sqlite://elsewhere.db");

        let resolver = ProcessEnv::default();
        assert_eq!(resolver.lookup("log"), None);
        assert_eq!(resolver.lookup("database-url"), None);

        env::remove_var(KEEL_LOG);
        env::remove_var(KEEL_DATABASE_URL);
    }

    #[test]
    #[serial]
    fn test_reserved_vars_ignored_under_any_prefix() {
        env::set_var(KEEL_LOG, "debug");
        env::set_var(KEEL_LABEL_RETRY_ATTEMPTS, "7");

        let resolver = ProcessEnv::new("KEEL_");
        assert_eq!(resolver.lookup("log"), None);
        assert_eq!(resolver.lookup("label-retry-attempts"), None);
        assert!(is_reserved_env_var(&env_key("KEEL_", "env.prefix")));
        assert!(!is_reserved_env_var(&env_key("KEEL_", "server-url")));

        env::remove_var(KEEL_LOG);
        env::remove_var(KEEL_LABEL_RETRY_ATTEMPTS);
    }
}
