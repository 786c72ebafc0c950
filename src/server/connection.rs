// Connection handling module
// Serves one accepted TCP connection under the graceful shutdown watcher

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpStream;

use crate::config::Config;
use crate::handler::RequestHandler;
use crate::logger;

/// HTTP/1 settings applied to every connection
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    pub keep_alive: bool,
    pub header_read_timeout: Option<Duration>,
}

impl ConnectionSettings {
    pub const fn from_config(config: &Config) -> Self {
        Self {
            keep_alive: config.performance.keep_alive,
            header_read_timeout: config.header_read_timeout(),
        }
    }
}

/// Serve a single connection in a spawned task.
///
/// The connection is registered with `graceful`, so once shutdown starts it
/// finishes its in-flight request and then closes instead of waiting for the
/// next keep-alive request.
pub fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    handler: &Arc<RequestHandler>,
    settings: ConnectionSettings,
    graceful: &GracefulShutdown,
) {
    let io = TokioIo::new(stream);
    let handler = Arc::clone(handler);

    let mut builder = http1::Builder::new();
    builder
        .keep_alive(settings.keep_alive)
        .timer(TokioTimer::new())
        .header_read_timeout(settings.header_read_timeout);

    let conn = builder.serve_connection(
        io,
        service_fn(move |req| {
            let handler = Arc::clone(&handler);
            async move { handler.handle(req, Some(peer_addr)).await }
        }),
    );
    let conn = graceful.watch(conn);

    tokio::spawn(async move {
        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
    });
}
