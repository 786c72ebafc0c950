//! Serve a local directory over HTTP.
//!
//! GET requests are answered from the directory, any other method gets
//! `405 Method Not Allowed`, every request produces one access log line, and
//! the server drains in-flight connections on SIGINT/SIGTERM.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use crate::config::Config;
pub use crate::error::{Result, ServerError};
pub use crate::server::{Server, ServerState, ShutdownSignal};
