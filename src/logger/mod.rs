//! Logger module
//!
//! Every line goes to one diagnostic stream (stderr), prefixed with the
//! local time:
//! - Server lifecycle logging
//! - One access line per request
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;
use std::path::Path;

use chrono::Local;

const TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

fn write_line(message: &str) {
    eprintln!("{} {message}", Local::now().format(TIME_FORMAT));
}

pub fn log_error(message: &str) {
    write_line(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_line(&format!("[WARN] {message}"));
}

/// Log an already formatted access log line
pub fn log_access(line: &str) {
    write_line(line);
}

pub fn log_server_start(addr: &SocketAddr, root: &Path) {
    write_line(&format!(
        "Starting server on {addr} serving files from {}",
        root.display()
    ));
}

pub fn log_signal_received(signal: &str) {
    write_line(&format!("Received {signal}"));
}

pub fn log_shutting_down() {
    write_line("Shutting down server...");
}

pub fn log_server_stopped() {
    write_line("Server stopped");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    log_error(&format!("Failed to serve connection: {err}"));
}
