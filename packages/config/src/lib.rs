// ABOUTME: Configuration and environment handling for Keel
// ABOUTME: Env var constants, override resolution and reconcile settings

pub mod config;
pub mod constants;
pub mod env;

pub use config::{ConfigError, ConfigResult, ReconcileConfig};
pub use env::{env_key, is_reserved_env_var, EnvResolver, ProcessEnv, StaticEnv};
