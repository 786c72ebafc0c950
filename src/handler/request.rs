//! Request entry point
//!
//! Checks the method, hands GET requests to the [`FileServer`] through a
//! [`StatusRecorder`], and writes one access log line per request.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, StatusCode};

use crate::config::LoggingConfig;
use crate::handler::static_files::FileServer;
use crate::http::{response, BufferedResponse, StatusRecorder};
use crate::logger::{self, AccessLogEntry};

pub struct RequestHandler {
    files: FileServer,
    logging: LoggingConfig,
}

impl RequestHandler {
    pub const fn new(files: FileServer, logging: LoggingConfig) -> Self {
        Self { files, logging }
    }

    pub fn root(&self) -> &Path {
        self.files.root()
    }

    /// Main entry point for HTTP request handling
    pub async fn handle<B>(
        &self,
        req: Request<B>,
        remote_addr: Option<SocketAddr>,
    ) -> Result<Response<Full<Bytes>>, Infallible> {
        Ok(self.handle_with(req, remote_addr, logger::log_access).await)
    }

    /// Handle a request, passing its formatted access line to `log`
    ///
    /// `log` is called exactly once per request while access logging is
    /// enabled, and never otherwise.
    pub async fn handle_with<B, F>(
        &self,
        req: Request<B>,
        remote_addr: Option<SocketAddr>,
        log: F,
    ) -> Response<Full<Bytes>>
    where
        F: FnOnce(&str),
    {
        let started = Instant::now();
        // the body is never read
        let (parts, _) = req.into_parts();

        let (buffered, status) = self.respond(&parts).await;

        if self.logging.access_log {
            let mut entry = access_entry(&parts, remote_addr, status);
            entry.body_bytes = buffered.body().len();
            entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
            log(&entry.format(&self.logging.access_log_format));
        }

        buffered.into_response()
    }

    /// Produce the response for a request, with the status that was sent
    pub async fn respond(&self, parts: &Parts) -> (BufferedResponse, StatusCode) {
        let mut buffered = BufferedResponse::new();

        if parts.method != Method::GET {
            response::method_not_allowed(&mut buffered);
            return (buffered, StatusCode::METHOD_NOT_ALLOWED);
        }

        let mut recorder = StatusRecorder::new(&mut buffered);
        self.files.serve(&mut recorder, parts).await;
        let status = recorder.status();

        (buffered, status)
    }
}

/// Access log entry with the request's original method and path
pub fn access_entry(
    parts: &Parts,
    remote_addr: Option<SocketAddr>,
    status: StatusCode,
) -> AccessLogEntry {
    AccessLogEntry::new(
        remote_addr.map_or_else(|| "-".to_string(), |a| a.to_string()),
        parts.method.to_string(),
        parts.uri.path().to_string(),
        status,
    )
}
