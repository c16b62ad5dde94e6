//! Application configuration.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, defaults)
//! - The library `Config` type (no CLI dependencies)
//! - The key=value configuration file loader

mod constants;
mod file;
mod types;

// Re-export all constants
pub use constants::*;
pub use file::{default_config_paths, parse_config, parse_config_bool, resolve_config_file, ConfigFileError};
pub use types::{Config, LogFormat, LogLevel};
