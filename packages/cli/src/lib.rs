// ABOUTME: Library side of the keel binary
// ABOUTME: Config loading, defaults parsing, logging setup and table output

pub mod config;
pub mod defaults;
pub mod logging;
pub mod output;


pub use config::CliConfig;
pub use defaults::{load_defaults, parse_defaults, DefaultsError};
