use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::header::HOST;
use hyper::{Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serve_dir::cli::Cli;
use serve_dir::{Config, Server, ServerError, ServerState};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    state: watch::Receiver<ServerState>,
    task: JoinHandle<serve_dir::Result<()>>,
}

fn config_for(dir: &Path, shutdown_timeout: u64) -> Config {
    let cli = Cli {
        addr: Some("127.0.0.1".to_string()),
        port: Some(0),
        dir: Some(dir.to_string_lossy().into_owned()),
        config: "tests/no-such-config.toml".to_string(),
        shutdown_timeout: Some(shutdown_timeout),
        ..Cli::default()
    };
    Config::load(&cli).unwrap()
}

async fn start(config: &Config) -> TestServer {
    let server = Server::bind(config).unwrap();
    let addr = server.local_addr();
    let mut state = server.state();
    let (shutdown, rx) = oneshot::channel::<()>();
    let task = tokio::spawn(server.run_until(async {
        let _ = rx.await;
    }));
    state
        .wait_for(|s| *s == ServerState::Listening)
        .await
        .unwrap();
    TestServer {
        addr,
        shutdown,
        state,
        task,
    }
}

fn site() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>it works</h1>").unwrap();
    dir
}

async fn send(addr: SocketAddr, method: Method, path: &str) -> (StatusCode, Bytes) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .unwrap();
    tokio::spawn(conn);

    let req = Request::builder()
        .method(method)
        .uri(path)
        .header(HOST, addr.to_string())
        .body(Empty::<Bytes>::new())
        .unwrap();
    let resp = sender.send_request(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

async fn assert_refuses_connections(addr: SocketAddr) {
    for _ in 0..50 {
        if TcpStream::connect(addr).await.is_err() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {addr} still accepts connections after shutdown");
}

#[tokio::test]
async fn test_scenario() {
    let dir = site();
    let server = start(&config_for(dir.path(), 5)).await;

    let (status, body) = send(server.addr, Method::GET, "/index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"<h1>it works</h1>");

    let (status, body) = send(server.addr, Method::POST, "/index.html").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(&body[..], b"Method Not Allowed\n");

    let (status, _) = send(server.addr, Method::GET, "/missing.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    server.shutdown.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_repeated_gets_are_identical() {
    let dir = site();
    let server = start(&config_for(dir.path(), 5)).await;

    let first = send(server.addr, Method::GET, "/").await;
    for _ in 0..3 {
        assert_eq!(send(server.addr, Method::GET, "/").await, first);
    }
    assert_eq!(first.0, StatusCode::OK);

    server.shutdown.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_shutdown_stops_accepting() {
    let dir = site();
    let mut server = start(&config_for(dir.path(), 5)).await;

    server.shutdown.send(()).unwrap();
    server.task.await.unwrap().unwrap();
    assert_eq!(*server.state.borrow_and_update(), ServerState::Stopped);
    assert_refuses_connections(server.addr).await;
}

#[tokio::test]
async fn test_idle_keep_alive_connection_does_not_block_shutdown() {
    let dir = site();
    let server = start(&config_for(dir.path(), 5)).await;

    let stream = TcpStream::connect(server.addr).await.unwrap();
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .unwrap();
    tokio::spawn(conn);
    let req = Request::builder()
        .uri("/index.html")
        .header(HOST, server.addr.to_string())
        .body(Empty::<Bytes>::new())
        .unwrap();
    let resp = sender.send_request(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.into_body().collect().await.unwrap();

    // `sender` keeps the connection open and idle
    server.shutdown.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(2), server.task)
        .await
        .expect("idle connection held up shutdown")
        .unwrap()
        .unwrap();
    drop(sender);
}

#[tokio::test]
async fn test_bind_conflict_is_an_error() {
    let dir = site();
    let server = start(&config_for(dir.path(), 5)).await;

    let mut config = config_for(dir.path(), 5);
    config.server.port = server.addr.port();
    assert!(matches!(
        Server::bind(&config),
        Err(ServerError::Bind { addr, .. }) if addr == server.addr
    ));

    server.shutdown.send(()).unwrap();
    server.task.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_missing_directory_is_an_error() {
    let dir = site();
    let config = config_for(&dir.path().join("nope"), 5);
    assert!(matches!(
        Server::bind(&config),
        Err(ServerError::InvalidDirectory { .. })
    ));
}

#[cfg(unix)]
mod in_flight {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;

    /// A FIFO makes the server's file read block until the test writes to it
    fn make_fifo(dir: &Path) -> PathBuf {
        let path = dir.join("slow.bin");
        let status = std::process::Command::new("mkfifo")
            .arg(&path)
            .status()
            .unwrap();
        assert!(status.success());
        path
    }

    /// Opening the write end returns once the server has opened the read end
    async fn open_writer(path: PathBuf) -> File {
        tokio::task::spawn_blocking(move || File::options().write(true).open(path))
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_in_flight_request_completes_during_shutdown() {
        let dir = site();
        let fifo = make_fifo(dir.path());
        let mut server = start(&config_for(dir.path(), 10)).await;

        let addr = server.addr;
        let client = tokio::spawn(async move { send(addr, Method::GET, "/slow.bin").await });
        let mut writer = open_writer(fifo).await;

        server.shutdown.send(()).unwrap();
        server
            .state
            .wait_for(|s| *s == ServerState::ShuttingDown)
            .await
            .unwrap();
        assert_refuses_connections(addr).await;
        assert!(!server.task.is_finished());

        writer.write_all(b"late bytes").unwrap();
        drop(writer);

        let (status, body) = client.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"late bytes");

        server.task.await.unwrap().unwrap();
        assert_eq!(*server.state.borrow(), ServerState::Stopped);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shutdown_deadline_is_enforced() {
        let dir = site();
        let fifo = make_fifo(dir.path());
        let server = start(&config_for(dir.path(), 1)).await;

        let addr = server.addr;
        let client = tokio::spawn(async move {
            let stream = TcpStream::connect(addr).await.unwrap();
            let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
                .await
                .unwrap();
            tokio::spawn(conn);
            let req = Request::builder()
                .uri("/slow.bin")
                .header(HOST, addr.to_string())
                .body(Empty::<Bytes>::new())
                .unwrap();
            let _ = sender.send_request(req).await;
        });
        let writer = open_writer(fifo).await;

        server.shutdown.send(()).unwrap();
        let result = server.task.await.unwrap();
        assert!(matches!(result, Err(ServerError::ShutdownTimeout(d)) if d == Duration::from_secs(1)));

        // release the blocked read so the runtime can shut down
        drop(writer);
        let _ = client.await;
    }
}
