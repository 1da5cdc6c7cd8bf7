//! End-to-end tests against a listener on an ephemeral port.

use std::net::SocketAddr;

use healthd::config::ServerConfig;
use healthd::server::{Listener, healthcheck_url};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const HEALTH_BODY: &str = r#"{"status": "ok", "message": "Server is running"}"#;

async fn start(hello_route: bool) -> SocketAddr {
    let cfg = ServerConfig {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        hello_route,
        ..ServerConfig::default()
    };
    let listener = Listener::bind(&cfg).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(listener.run());
    addr
}

/// Sends `raw` and reads until the server closes its side.
async fn exchange(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw).await.unwrap();

    let mut out = Vec::new();
    // An abandoned connection may surface as a reset rather than EOF.
    let _ = stream.read_to_end(&mut out).await;
    out
}

fn split_response(raw: &[u8]) -> (String, String) {
    let text = String::from_utf8(raw.to_vec()).unwrap();
    let (head, body) = text.split_once("\r\n\r\n").unwrap();
    (head.to_string(), body.to_string())
}

#[tokio::test]
async fn test_get_root_returns_health_body() {
    let addr = start(false).await;
    let raw = exchange(addr, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Type: application/json"));
    assert!(head.contains("Server: Boost Server"));
    assert!(head.contains(&format!("Content-Length: {}", HEALTH_BODY.len())));
    assert_eq!(body, HEALTH_BODY);
}

#[tokio::test]
async fn test_get_healthcheck_returns_health_body() {
    let addr = start(false).await;
    let raw = exchange(addr, b"GET /healthcheck HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, HEALTH_BODY);
}

#[tokio::test]
async fn test_unknown_path_returns_not_found() {
    let addr = start(false).await;
    let raw = exchange(addr, b"GET /nonexistent HTTP/1.1\r\n\r\n").await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(head.contains("Content-Type: text/plain"));
    assert!(head.contains("Server: Boost Server"));
    assert!(head.contains("Content-Length: 9"));
    assert_eq!(body, "Not Found");
}

#[tokio::test]
async fn test_same_request_gives_identical_bytes() {
    let addr = start(false).await;
    let req = b"GET /healthcheck HTTP/1.1\r\n\r\n";

    let first = exchange(addr, req).await;
    let second = exchange(addr, req).await;

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_connections_are_independent() {
    let addr = start(false).await;

    let mut handles = Vec::new();
    for i in 0..32 {
        handles.push(tokio::spawn(async move {
            let raw: &[u8] = if i % 2 == 0 {
                b"GET /healthcheck HTTP/1.1\r\n\r\n"
            } else {
                b"GET /missing HTTP/1.1\r\n\r\n"
            };
            (i, exchange(addr, raw).await)
        }));
    }

    for handle in handles {
        let (i, raw) = handle.await.unwrap();
        let (head, body) = split_response(&raw);
        if i % 2 == 0 {
            assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
            assert_eq!(body, HEALTH_BODY);
        } else {
            assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
            assert_eq!(body, "Not Found");
        }
    }
}

#[tokio::test]
async fn test_request_split_across_writes() {
    let addr = start(false).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();

    stream.write_all(b"GET /healthch").await.unwrap();
    stream.flush().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    stream.write_all(b"eck HTTP/1.1\r\n\r\n").await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    let (_, body) = split_response(&out);
    assert_eq!(body, HEALTH_BODY);
}

#[tokio::test]
async fn test_only_first_pipelined_request_is_answered() {
    let addr = start(false).await;
    let raw = exchange(
        addr,
        b"GET / HTTP/1.1\r\n\r\nGET /missing HTTP/1.1\r\n\r\n",
    )
    .await;

    let text = String::from_utf8(raw).unwrap();
    assert_eq!(text.matches("HTTP/1.1 ").count(), 1);
    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_client_reads_until_server_half_closes() {
    let addr = start(false).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_chunked_post_is_answered() {
    let addr = start(false).await;
    let raw = exchange(
        addr,
        b"POST /healthcheck HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nabc\r\n0\r\n\r\n",
    )
    .await;
    let (_, body) = split_response(&raw);

    assert_eq!(body, HEALTH_BODY);
}

#[tokio::test]
async fn test_silent_client_gets_no_response() {
    let addr = start(false).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.shutdown().await.unwrap();

    let mut out = Vec::new();
    let _ = stream.read_to_end(&mut out).await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_malformed_request_gets_no_response() {
    let addr = start(false).await;

    for raw in [
        b"this is not http\r\n\r\n".as_slice(),
        b"GET / HTTP/9.9\r\n\r\n",
        b"GET / HTTP/1.1\r\nno colon here\r\n\r\n",
        b"GET / HTTP/1.1\r\nContent-Length: +0\r\n\r\n",
        b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\nFFFFFFFFFFFFFFED\r\nab",
    ] {
        assert!(exchange(addr, raw).await.is_empty());
    }
}

#[tokio::test]
async fn test_truncated_request_gets_no_response() {
    let addr = start(false).await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"GET /healthcheck HTTP/1.1\r\nHost: x\r\n").await.unwrap();
    stream.shutdown().await.unwrap();

    let mut out = Vec::new();
    let _ = stream.read_to_end(&mut out).await;
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_server_survives_abandoned_connections() {
    let addr = start(false).await;

    assert!(exchange(addr, b"junk\r\n\r\n").await.is_empty());
    let raw = exchange(addr, b"GET /healthcheck HTTP/1.1\r\n\r\n").await;
    assert!(raw.starts_with(b"HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_hello_route_when_enabled() {
    let addr = start(true).await;
    let raw = exchange(addr, b"GET /hello?name=Developer HTTP/1.1\r\n\r\n").await;
    let (head, body) = split_response(&raw);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body, "Hello, Developer!\n");
}

#[tokio::test]
async fn test_bind_conflict_is_an_error() {
    let addr = start(false).await;
    let cfg = ServerConfig {
        bind_addr: "127.0.0.1".to_string(),
        port: addr.port(),
        ..ServerConfig::default()
    };

    let err = Listener::bind(&cfg).await.err().unwrap();
    assert!(err.to_string().contains("failed to bind"));
}

#[test]
fn test_healthcheck_url() {
    assert_eq!(healthcheck_url(8080), "http://localhost:8080/healthcheck");
    assert_eq!(healthcheck_url(80), "http://localhost:80/healthcheck");
}
