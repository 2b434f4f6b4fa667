//! Listener lifecycle against real sockets: bind, concurrent delayed
//! requests, drain on shutdown, and the grace-period cutoff.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use httpecho_core::{EchoError, ExitStatus, RequestMetrics};
use httpecho_server::{
    app_state::AppState,
    config::ServerConfig,
    server::{DrainOutcome, Server},
};
use common::Capture;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

async fn request(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.unwrap();
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).await.unwrap();
    String::from_utf8_lossy(&buf).into_owned()
}

struct Running {
    addr: SocketAddr,
    metrics: Arc<RequestMetrics>,
    stop: oneshot::Sender<()>,
    done: JoinHandle<httpecho_core::Result<DrainOutcome>>,
}

async fn start(cfg: ServerConfig) -> Running {
    let metrics = Arc::new(RequestMetrics::new());
    let state = AppState::with_metrics(cfg, Arc::clone(&metrics)).unwrap();
    let server = Server::bind(&state).await.unwrap();
    let addr = server.local_addr();

    let (stop, rx) = oneshot::channel::<()>();
    let done = tokio::spawn(server.run_until(async move {
        let _ = rx.await;
    }));
    Running {
        addr,
        metrics,
        stop,
        done,
    }
}

#[tokio::test]
async fn bind_failure_is_fatal() {
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let state = AppState::new(ServerConfig::new(format!("127.0.0.1:{port}"), "1")).unwrap();
    let err = Server::bind(&state).await.err().expect("port is taken");
    assert!(matches!(err, EchoError::Bind { .. }));
    assert_eq!(err.exit_status(), ExitStatus::Fatal);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn serves_then_drains_on_shutdown() {
    let srv = start(ServerConfig::new("127.0.0.1:0", "edge-1")).await;

    let res = request(srv.addr, "/").await;
    assert!(res.starts_with("HTTP/1.1 200 OK"), "{res}");
    assert!(res.to_ascii_lowercase().contains("x-server-id: edge-1"), "{res}");
    assert!(res.ends_with("Port: 127.0.0.1:0, id: edge-1\n"), "{res}");

    let res = request(srv.addr, "/health").await;
    assert!(res.ends_with("{\"status\":\"ok\"}\n"), "{res}");

    let res = request(srv.addr, "/metrics").await;
    assert!(res.contains("reqs_count{server_id=\"edge-1\"} 1"), "{res}");

    srv.stop.send(()).unwrap();
    let outcome = srv.done.await.unwrap().unwrap();
    assert_eq!(outcome, DrainOutcome::Drained);
    assert_eq!(srv.metrics.get("edge-1"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bare_port_accepts_ipv4_and_ipv6() {
    if std::net::TcpListener::bind("[::1]:0").is_err() {
        // Host without an IPv6 loopback; the IPv4 fallback is all there is.
        return;
    }

    let srv = start(ServerConfig::new(":0", "dual")).await;
    assert!(srv.addr.is_ipv6(), "{}", srv.addr);
    let port = srv.addr.port();

    for host in ["127.0.0.1", "[::1]"] {
        let addr: SocketAddr = format!("{host}:{port}").parse().unwrap();
        let res = request(addr, "/").await;
        assert!(res.starts_with("HTTP/1.1 200 OK"), "{host}: {res}");
        assert!(res.ends_with("Port: :0, id: dual\n"), "{host}: {res}");
    }

    assert_eq!(srv.metrics.get("dual"), 2);
    srv.stop.send(()).unwrap();
    srv.done.await.unwrap().unwrap();
}

#[tokio::test]
async fn lifecycle_transitions_are_logged_at_info() {
    let capture = Capture::default();
    let _guard = capture.set_default();

    let state = AppState::new(ServerConfig::new("127.0.0.1:0", "1")).unwrap();
    let server = Server::bind(&state).await.unwrap();
    let outcome = server.run_until(async {}).await.unwrap();
    assert_eq!(outcome, DrainOutcome::Drained);

    let out = capture.contents();
    for to in ["to=Listening", "to=ShuttingDown", "to=Stopped"] {
        let line = out
            .lines()
            .find(|l| l.contains("lifecycle transition") && l.contains(to))
            .unwrap_or_else(|| panic!("no {to} transition in: {out}"));
        assert!(line.contains("INFO"), "{line}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn delays_do_not_serialize() {
    let cfg = ServerConfig::new("127.0.0.1:0", "1").with_delay(Duration::from_millis(200));
    let srv = start(cfg).await;

    let started = Instant::now();
    request(srv.addr, "/").await;
    assert!(started.elapsed() >= Duration::from_millis(200));

    let started = Instant::now();
    let clients: Vec<_> = (0..10)
        .map(|_| tokio::spawn(request(srv.addr, "/")))
        .collect();
    for c in clients {
        assert!(c.await.unwrap().starts_with("HTTP/1.1 200 OK"));
    }
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(200), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(1500), "delays summed: {elapsed:?}");

    assert_eq!(srv.metrics.get("1"), 11);
    srv.stop.send(()).unwrap();
    srv.done.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn in_flight_request_finishes_within_grace() {
    let cfg = ServerConfig::new("127.0.0.1:0", "1").with_delay(Duration::from_millis(400));
    let srv = start(cfg).await;

    let client = tokio::spawn(request(srv.addr, "/"));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let stopped_at = Instant::now();
    srv.stop.send(()).unwrap();

    let res = client.await.unwrap();
    assert!(res.starts_with("HTTP/1.1 200 OK"), "{res}");
    assert!(res.ends_with("Port: 127.0.0.1:0, id: 1\n"), "{res}");

    assert_eq!(srv.done.await.unwrap().unwrap(), DrainOutcome::Drained);
    assert!(stopped_at.elapsed() < Duration::from_secs(5));
    assert_eq!(srv.metrics.get("1"), 1);
}

#[test]
fn grace_period_cuts_off_slow_requests() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    let cfg = ServerConfig::new("127.0.0.1:0", "1")
        .with_delay(Duration::from_secs(3))
        .with_shutdown_grace(Duration::from_millis(200));
    let state = AppState::new(cfg).unwrap();
    let server = rt.block_on(Server::bind(&state)).unwrap();
    let addr = server.local_addr();

    let client = std::thread::spawn(move || {
        let mut stream = std::net::TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(10)))
            .unwrap();
        stream
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .unwrap();
        let mut buf = Vec::new();
        let _ = stream.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    });

    let started = Instant::now();
    let outcome = rt
        .block_on(async {
            server
                .run_until(tokio::time::sleep(Duration::from_millis(300)))
                .await
        })
        .unwrap();
    assert_eq!(outcome, DrainOutcome::DeadlineExceeded);
    assert!(started.elapsed() < Duration::from_secs(2));

    // Tearing the runtime down severs whatever the drain left behind.
    drop(rt);

    let res = client.join().unwrap();
    assert!(!res.contains("200 OK"), "{res}");
    assert_eq!(state.metrics().get("1"), 0);
}
