//! Climate API Core Library
//!
//! Shared utilities for the api service:
//! - Configuration loading (XDG-compliant)
//! - File system utilities

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::path_exists;

/// Application name used for XDG paths
pub const APP_NAME: &str = "climate-api";

/// Default api port
pub const DEFAULT_API_PORT: u16 = 5000;
