use std::env;
use std::num::ParseIntError;

use thiserror::Error;

use crate::constants::{
    DEFAULT_ENV_PREFIX, DEFAULT_LABEL_RETRY_ATTEMPTS, KEEL_ENV_PREFIX,
    KEEL_LABEL_RETRY_ATTEMPTS, MAX_LABEL_RETRY_ATTEMPTS,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid retry attempt count: {0}")]
    InvalidRetryAttempts(#[from] ParseIntError),
    #[error("Retry attempts {0} out of range (1-{max})", max = MAX_LABEL_RETRY_ATTEMPTS)]
    RetryAttemptsOutOfRange(u32),
    #[error("Override prefix cannot be empty")]
    EmptyPrefix,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Knobs for a reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    pub env_prefix: String,
    pub label_retry_attempts: u32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            label_retry_attempts: DEFAULT_LABEL_RETRY_ATTEMPTS,
        }
    }
}

impl ReconcileConfig {
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_prefix =
            lookup(KEEL_ENV_PREFIX).unwrap_or_else(|| DEFAULT_ENV_PREFIX.to_string());
        if env_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }

        let label_retry_attempts = match lookup(KEEL_LABEL_RETRY_ATTEMPTS) {
            Some(raw) => raw.trim().parse::<u32>()?,
            None => DEFAULT_LABEL_RETRY_ATTEMPTS,
        };

        if label_retry_attempts == 0 || label_retry_attempts > MAX_LABEL_RETRY_ATTEMPTS {
            return Err(ConfigError::RetryAttemptsOutOfRange(label_retry_attempts));
        }

        Ok(Self {
            env_prefix,
            label_retry_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ReconcileConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ReconcileConfig::default());
        assert_eq!(config.label_retry_attempts, 5);
        assert_eq!(config.env_prefix, "KEEL_SETTING_");
    }

    #[test]
    fn test_reads_overrides() {
        let config = ReconcileConfig::from_lookup(lookup_from(&[
            (KEEL_ENV_PREFIX, "APP_"),
            (KEEL_LABEL_RETRY_ATTEMPTS, " 3 "),
        ]))
        .unwrap();

        assert_eq!(config.env_prefix, "APP_");
        assert_eq!(config.label_retry_attempts, 3);
    }

    #[test]
    fn test_rejects_invalid_retry_attempts() {
        let result =
            ReconcileConfig::from_lookup(lookup_from(&[(KEEL_LABEL_RETRY_ATTEMPTS, "zero")]));
        assert!(matches!(result, Err(ConfigError::InvalidRetryAttempts(_))));

        let result =
            ReconcileConfig::from_lookup(lookup_from(&[(KEEL_LABEL_RETRY_ATTEMPTS, "0")]));
        assert!(matches!(result, Err(ConfigError::RetryAttemptsOutOfRange(0))));

        let result =
            ReconcileConfig::from_lookup(lookup_from(&[(KEEL_LABEL_RETRY_ATTEMPTS, "21")]));
        assert!(matches!(result, Err(ConfigError::RetryAttemptsOutOfRange(21))));
    }

    #[test]
    fn test_rejects_empty_prefix() {
        let result = ReconcileConfig::from_lookup(lookup_from(&[(KEEL_ENV_PREFIX, "")]));
        assert!(matches!(result, Err(ConfigError::EmptyPrefix)));
    }
}
