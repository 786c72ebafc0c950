// Configuration module entry point
// Layers built-in defaults, an optional TOML file, environment and CLI flags

mod types;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::{Result, ServerError};

pub use types::{
    Config, FilesConfig, LoggingConfig, PerformanceConfig, ServerConfig, ShutdownConfig,
};

const ENV_PREFIX: &str = "SERVE_DIR";

impl Config {
    /// Load configuration, highest precedence last:
    /// defaults, config file, `SERVE_DIR_*` environment, command-line flags
    pub fn load(cli: &Cli) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("server.addr", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.dir", ".")?
            .set_default("shutdown.timeout_secs", 30)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout_secs", 30)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "plain")?
            .add_source(config::File::with_name(&cli.config).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_override_option("server.addr", cli.addr.clone())?
            .set_override_option("server.port", cli.port.map(i64::from))?
            .set_override_option("server.dir", cli.dir.clone())?
            .set_override_option("server.workers", cli.workers.map(|w| w.to_string()))?
            .set_override_option(
                "shutdown.timeout_secs",
                cli.shutdown_timeout.map(|s| s.to_string()),
            )?
            .set_override_option("logging.access_log", cli.no_access_log.then_some(false))?
            .set_override_option("files.directory_listing", cli.no_listing.then_some(false))?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .addr
            .parse()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.server.addr.clone(),
                source,
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Resolve the served directory to an absolute path and check it exists
    pub fn resolve_root(&self) -> Result<PathBuf> {
        let invalid = |path: PathBuf, reason: String| ServerError::InvalidDirectory { path, reason };

        let path = std::path::absolute(&self.server.dir)
            .map_err(|e| invalid(PathBuf::from(&self.server.dir), e.to_string()))?;

        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => Ok(path),
            Ok(_) => Err(invalid(path, "not a directory".to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(invalid(path, "does not exist".to_string()))
            }
            Err(e) => Err(invalid(path, e.to_string())),
        }
    }

    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown.timeout_secs)
    }

    pub const fn header_read_timeout(&self) -> Option<Duration> {
        match self.performance.header_read_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
