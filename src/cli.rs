//! Command-line interface
//!
//! Every flag is optional: unset flags fall through to the config file,
//! environment and built-in defaults (see [`crate::config::Config::load`]).

use clap::Parser;

pub const DEFAULT_CONFIG_FILE: &str = "serve-dir.toml";

#[derive(Debug, Default, Parser)]
#[command(name = "serve-dir", version, about = "Serve a local directory over HTTP")]
pub struct Cli {
    /// IP address to bind to [default: 0.0.0.0]
    #[arg(long)]
    pub addr: Option<String>,

    /// Port to bind to [default: 8080]
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory to serve files from [default: .]
    #[arg(long)]
    pub dir: Option<String>,

    /// Configuration file (TOML)
    #[arg(long, env = "SERVE_DIR_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Number of runtime worker threads [default: CPU cores]
    #[arg(long)]
    pub workers: Option<usize>,

    /// Seconds to wait for in-flight requests on shutdown [default: 30]
    #[arg(long = "shutdown-timeout", value_name = "SECS")]
    pub shutdown_timeout: Option<u64>,

    /// Disable per-request access logging
    #[arg(long = "no-access-log")]
    pub no_access_log: bool,

    /// Answer 403 instead of listing directories without an index file
    #[arg(long = "no-listing")]
    pub no_listing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_everything_unset() {
        let cli = Cli::try_parse_from(["serve-dir"]).unwrap();
        assert!(cli.addr.is_none());
        assert!(cli.port.is_none());
        assert!(cli.dir.is_none());
        assert!(!cli.no_access_log);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "serve-dir",
            "--addr",
            "127.0.0.1",
            "--port",
            "9000",
            "--dir",
            "/srv/www",
            "--shutdown-timeout",
            "5",
            "--no-listing",
        ])
        .unwrap();
        assert_eq!(cli.addr.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.dir.as_deref(), Some("/srv/www"));
        assert_eq!(cli.shutdown_timeout, Some(5));
        assert!(cli.no_listing);
    }

    #[test]
    fn test_rejects_invalid_port() {
        assert!(Cli::try_parse_from(["serve-dir", "--port", "http"]).is_err());
        assert!(Cli::try_parse_from(["serve-dir", "--port", "70000"]).is_err());
    }
}
