//! Access log format module
//!
//! Supports:
//! - `plain` (`METHOD PATH STATUS`, the default)
//! - `common` (Common Log Format - CLF)
//! - Custom patterns with variables

use chrono::Local;
use hyper::StatusCode;

/// One access log entry, produced once per handled request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client address, `-` when unknown
    pub remote_addr: String,
    /// Request timestamp
    pub time: chrono::DateTime<Local>,
    /// HTTP method as received
    pub method: String,
    /// Request URI path as received, without query string
    pub path: String,
    /// Status code sent to the client
    pub status: StatusCode,
    /// Response body size in bytes
    pub body_bytes: usize,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: String, method: String, path: String, status: StatusCode) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            status,
            body_bytes: 0,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "plain" => self.format_plain(),
            "common" => self.format_common(),
            custom => self.format_custom(custom),
        }
    }

    /// `$request_method $request_uri $status`
    fn format_plain(&self) -> String {
        format!("{} {} {}", self.method, self.path, self.status.as_u16())
    }

    /// Common Log Format (CLF)
    /// `$remote_addr - - [$time_local] "$request_method $request_uri" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.path,
            self.status.as_u16(),
            self.body_bytes,
        )
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables:
    /// - `$remote_addr` - Client address
    /// - `$time_local` - Local time in Common Log Format
    /// - `$request_method` - HTTP method
    /// - `$request_uri` - Request path
    /// - `$status` - Response status code
    /// - `$body_bytes_sent` - Response body size
    /// - `$request_time` - Request processing time in seconds (3 decimal places)
    fn format_custom(&self, pattern: &str) -> String {
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        pattern
            .replace("$remote_addr", &self.remote_addr)
            .replace(
                "$time_local",
                &self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            )
            .replace("$request_time", &format!("{request_time:.3}"))
            .replace("$request_method", &self.method)
            .replace("$request_uri", &self.path)
            .replace("$status", &self.status.as_u16().to_string())
            .replace("$body_bytes_sent", &self.body_bytes.to_string())
    }
}
