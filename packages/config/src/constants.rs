// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Keel

// Storage
pub const KEEL_DATABASE_URL: &str = "KEEL_DATABASE_URL";

// Reconciliation
pub const KEEL_ENV_PREFIX: &str = "KEEL_ENV_PREFIX";
pub const KEEL_LABEL_RETRY_ATTEMPTS: &str = "KEEL_LABEL_RETRY_ATTEMPTS";

// Logging
pub const KEEL_LOG: &str = "KEEL_LOG";
pub const RUST_LOG: &str = "RUST_LOG"; // Fallback

/// Prefix prepended to a setting name to form its override variable.
/// Kept apart from the `KEEL_*` configuration variables above.
pub const DEFAULT_ENV_PREFIX: &str = "KEEL_SETTING_";

/// Variables Keel reads for itself; never treated as setting overrides
pub const RESERVED_ENV_VARS: &[&str] = &[
    KEEL_DATABASE_URL,
    KEEL_ENV_PREFIX,
    KEEL_LABEL_RETRY_ATTEMPTS,
    KEEL_LOG,
    RUST_LOG,
];

pub const DEFAULT_DATABASE_URL: &str = "sqlite://keel.db";

/// Attempts allowed when labeling an unknown setting races another writer
pub const DEFAULT_LABEL_RETRY_ATTEMPTS: u32 = 5;
pub const MAX_LABEL_RETRY_ATTEMPTS: u32 = 20;
