use std::env;

use keel_config::constants::{DEFAULT_DATABASE_URL, KEEL_DATABASE_URL};
use keel_config::{ConfigError, ReconcileConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub database_url: String,
    pub reconcile: ReconcileConfig,
}

impl CliConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var(KEEL_DATABASE_URL).unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        Ok(CliConfig {
            database_url,
            reconcile: ReconcileConfig::from_env()?,
        })
    }

    /// Command-line flag beats the environment.
    pub fn with_database_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.database_url = url;
        }
        self
    }
}
