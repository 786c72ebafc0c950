// Server lifecycle module
// Initializing -> Listening -> ShuttingDown -> Stopped

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::sync::{watch, Notify};

use super::connection::{serve_connection, ConnectionSettings};
use super::listener::create_listener;
use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::handler::{FileServer, RequestHandler};
use crate::logger;

/// Back-off after a failed `accept`, e.g. when out of file descriptors
const ACCEPT_ERROR_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Initializing,
    Listening,
    ShuttingDown,
    Stopped,
}

/// A bound server that has not started accepting yet
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    handler: Arc<RequestHandler>,
    settings: ConnectionSettings,
    shutdown_timeout: Duration,
    state: watch::Sender<ServerState>,
}

impl Server {
    /// Resolve the served directory and bind the listening socket
    ///
    /// Must be called from within a Tokio runtime.
    pub fn bind(config: &Config) -> Result<Self> {
        let root = config.resolve_root()?;
        let files = FileServer::new(&root, config.files.clone()).map_err(|e| {
            ServerError::InvalidDirectory {
                path: root.clone(),
                reason: e.to_string(),
            }
        })?;

        let addr = config.socket_addr()?;
        let listener = create_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        let (state, _) = watch::channel(ServerState::Initializing);

        Ok(Self {
            listener,
            local_addr,
            handler: Arc::new(RequestHandler::new(files, config.logging.clone())),
            settings: ConnectionSettings::from_config(config),
            shutdown_timeout: config.shutdown_timeout(),
            state,
        })
    }

    /// Address actually bound, which differs from the configured one for port 0
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Observe lifecycle transitions
    pub fn state(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Serve until `shutdown` resolves, then drain in-flight connections
    ///
    /// New connections stop being accepted as soon as `shutdown` resolves.
    /// Returns `ServerError::ShutdownTimeout` if the remaining connections do
    /// not finish within the configured shutdown timeout.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        logger::log_server_start(&self.local_addr, self.handler.root());

        let stop = Arc::new(Notify::new());
        let accept_task = tokio::spawn(accept_loop(
            self.listener,
            Arc::clone(&self.handler),
            self.settings,
            Arc::clone(&stop),
        ));
        self.state.send_replace(ServerState::Listening);

        shutdown.await;

        logger::log_shutting_down();
        self.state.send_replace(ServerState::ShuttingDown);

        stop.notify_one();
        let graceful = accept_task.await.map_err(std::io::Error::other)?;

        if tokio::time::timeout(self.shutdown_timeout, graceful.shutdown())
            .await
            .is_err()
        {
            return Err(ServerError::ShutdownTimeout(self.shutdown_timeout));
        }

        self.state.send_replace(ServerState::Stopped);
        logger::log_server_stopped();
        Ok(())
    }
}

/// Accept connections until `stop` is notified; the listener is closed on
/// return and the watcher for all accepted connections handed back
async fn accept_loop(
    listener: TcpListener,
    handler: Arc<RequestHandler>,
    settings: ConnectionSettings,
    stop: Arc<Notify>,
) -> GracefulShutdown {
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        serve_connection(stream, peer_addr, &handler, settings, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                        tokio::time::sleep(ACCEPT_ERROR_DELAY).await;
                    }
                }
            }

            () = stop.notified() => break,
        }
    }

    drop(listener);
    graceful
}
