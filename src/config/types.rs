// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub shutdown: ShutdownConfig,
    pub performance: PerformanceConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub addr: String,
    pub port: u16,
    /// Directory to serve, resolved to an absolute path before startup
    pub dir: String,
    pub workers: Option<usize>,
}

/// Graceful shutdown configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ShutdownConfig {
    /// Upper bound on draining in-flight connections, in seconds
    pub timeout_secs: u64,
}

/// Per-connection behaviour
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// 0 disables the header read timeout
    pub header_read_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (plain, common, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

/// File serving configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FilesConfig {
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    #[serde(default = "default_directory_listing")]
    pub directory_listing: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "plain".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string()]
}

#[allow(clippy::missing_const_for_fn)]
fn default_directory_listing() -> bool {
    true
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            index_files: default_index_files(),
            directory_listing: default_directory_listing(),
        }
    }
}
