//! End-to-end tests of a single connection over an in-memory stream

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use lantern::access_log::{AccessLog, MemorySink};
use lantern::docroot::file::serve_file;
use lantern::http::connection::Connection;
use lantern::http::error::{RequestError, ServeError};
use lantern::http::mime::MimeRegistry;
use lantern::http::writer::ResponseWriter;
use lantern::server::ServerContext;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

struct Fixture {
    root: TempDir,
    ctx: Arc<ServerContext>,
    log: MemorySink,
}

fn fixture() -> Fixture {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("a.txt"), b"hello world\n").unwrap();
    fs::write(root.path().join("data.xyz"), b"unknown").unwrap();
    fs::write(root.path().join("a..b.txt"), b"dots").unwrap();
    fs::write(root.path().join("README"), b"no ext").unwrap();
    fs::create_dir(root.path().join("site")).unwrap();
    fs::write(root.path().join("site/index.html"), b"<h1>site</h1>").unwrap();
    fs::create_dir(root.path().join("files")).unwrap();
    fs::write(root.path().join("files/a.txt"), b"a").unwrap();
    fs::create_dir(root.path().join("files/sub")).unwrap();

    let (access_log, log) = AccessLog::memory();
    let ctx = ServerContext::new(root.path(), MimeRegistry::default(), access_log);

    Fixture {
        root,
        ctx: Arc::new(ctx),
        log,
    }
}

async fn exchange(ctx: &Arc<ServerContext>, request: &[u8]) -> Vec<u8> {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let ctx = Arc::clone(ctx);
    let handle = tokio::spawn(async move { Connection::new(server, ctx).run().await });

    client.write_all(request).await.unwrap();
    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();

    handle.await.unwrap().unwrap();
    response
}

fn split(response: &[u8]) -> (String, Vec<u8>) {
    let end = response
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no head terminator");
    let head = String::from_utf8(response[..end + 4].to_vec()).unwrap();
    (head, response[end + 4..].to_vec())
}

fn get(target: &str) -> Vec<u8> {
    format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n").into_bytes()
}

#[tokio::test]
async fn test_get_regular_file() {
    let fx = fixture();

    let response = exchange(&fx.ctx, &get("/a.txt")).await;
    let (head, body) = split(&response);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\nDate: "));
    assert!(head.contains("\r\nContent-Type: text/plain\r\n"));
    assert_eq!(body, b"hello world\n");

    let lines = fx.log.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" ] GET localhost /a.txt 200"));
}

#[tokio::test]
async fn test_get_large_binary_file_byte_for_byte() {
    let fx = fixture();
    let data: Vec<u8> = (0..100_000u32).map(|i| (i.wrapping_mul(31) % 256) as u8).collect();
    fs::write(fx.root.path().join("big.gif"), &data).unwrap();

    let response = exchange(&fx.ctx, &get("/big.gif")).await;
    let (head, body) = split(&response);

    assert!(head.contains("Content-Type: image/gif"));
    assert_eq!(body, data);
}

#[tokio::test]
async fn test_head_matches_get_without_body() {
    let fx = fixture();

    let response = exchange(&fx.ctx, b"HEAD /a.txt HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    let (head, body) = split(&response);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Type: text/plain"));
    assert!(body.is_empty());
    assert!(fx.log.lines()[0].ends_with(" ] HEAD localhost /a.txt 200"));
}

#[tokio::test]
async fn test_head_error_has_no_body() {
    let fx = fixture();

    let response = exchange(&fx.ctx, b"HEAD /missing.txt HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    let (head, body) = split(&response);

    assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_trace_echoes_raw_request() {
    let fx = fixture();
    let request = b"TRACE /anything%20here HTTP/1.1\r\nHost: localhost\r\nX-Probe: 1\r\n\r\n";

    let response = exchange(&fx.ctx, request).await;
    let (head, body) = split(&response);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Type: message/http"));
    assert_eq!(body, request.to_vec());
    assert!(fx.log.lines()[0].ends_with(" ] TRACE localhost /anything%20here 200"));
}

#[tokio::test]
async fn test_missing_resource_is_404_and_logged() {
    let fx = fixture();

    let response = exchange(&fx.ctx, &get("/nope.html")).await;
    let (head, body) = split(&response);

    assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(head.contains("Content-Type: text/html"));
    assert!(String::from_utf8(body).unwrap().contains("<title>404 Not Found</title>"));
    assert!(fx.log.lines()[0].ends_with(" ] GET localhost /nope.html 404"));
}

#[tokio::test]
async fn test_missing_host_is_400_and_logged() {
    let fx = fixture();

    let response = exchange(&fx.ctx, b"GET /a.txt HTTP/1.1\r\nAccept: */*\r\n\r\n").await;
    let (head, _) = split(&response);

    assert!(head.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(fx.log.lines()[0].ends_with(" ] GET NO HOST PROVIDED  400"));
}

#[tokio::test]
async fn test_unsupported_method_is_405() {
    let fx = fixture();

    let response = exchange(&fx.ctx, b"DELETE /a.txt HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    let (head, body) = split(&response);

    assert!(head.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    assert!(!body.is_empty());
    assert!(fx.log.lines()[0].ends_with(" ] DELETE localhost /a.txt 405"));
}

#[tokio::test]
async fn test_unknown_extension_is_415() {
    let fx = fixture();

    let response = exchange(&fx.ctx, &get("/data.xyz")).await;
    let (head, _) = split(&response);

    assert!(head.starts_with("HTTP/1.1 415 Unsupported Media Type\r\n"));
    assert!(fx.log.lines()[0].ends_with(" 415"));
}

#[tokio::test]
async fn test_dot_dot_in_name_is_400() {
    let fx = fixture();

    let response = exchange(&fx.ctx, &get("/a..b.txt")).await;
    let (head, body) = split(&response);

    assert!(head.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(!String::from_utf8(body).unwrap().contains("dots"));
    assert!(fx.log.lines()[0].ends_with(" ] GET localhost /a..b.txt 400"));
}

#[tokio::test]
async fn test_no_extension_is_400() {
    let fx = fixture();

    let response = exchange(&fx.ctx, &get("/README")).await;

    assert!(response.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn test_bad_escape_is_400() {
    let fx = fixture();

    let response = exchange(&fx.ctx, &get("/a%2")).await;

    assert!(response.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn test_directory_serves_index_file() {
    let fx = fixture();

    let response = exchange(&fx.ctx, &get("/site")).await;
    let (head, body) = split(&response);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Type: text/html"));
    assert_eq!(body, b"<h1>site</h1>");
    assert_eq!(fx.log.lines().len(), 1);
}

#[tokio::test]
async fn test_directory_listing() {
    let fx = fixture();

    let response = exchange(&fx.ctx, &get("/files/")).await;
    let (head, body) = split(&response);
    let page = String::from_utf8(body).unwrap();

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(head.contains("Content-Type: text/html"));
    assert!(page.contains("<base href='/files/'>"));
    assert!(page.contains(">a.txt</a>"));
    assert!(page.contains(">sub/</a>"));
    assert!(page.contains("[DIR]"));
    assert!(!page.contains("href=\".\""));
    assert!(!page.contains("href=\"..\""));

    let lines = fx.log.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(" ] GET localhost /files/ 200"));
}

#[tokio::test]
async fn test_head_directory_listing_logs_once() {
    let fx = fixture();

    let response = exchange(&fx.ctx, b"HEAD /files HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    let (head, body) = split(&response);

    assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(body.is_empty());
    assert_eq!(fx.log.lines().len(), 1);
}

#[tokio::test]
async fn test_empty_directory_listing() {
    let fx = fixture();
    fs::create_dir(fx.root.path().join("empty")).unwrap();

    let response = exchange(&fx.ctx, &get("/empty/")).await;
    let (_, body) = split(&response);

    assert!(String::from_utf8(body).unwrap().contains("No files found"));
}

#[tokio::test]
async fn test_closed_without_request_sends_nothing() {
    let fx = fixture();
    let (client, server) = tokio::io::duplex(1024);
    drop(client);

    Connection::new(server, Arc::clone(&fx.ctx)).run().await.unwrap();

    assert!(fx.log.lines().is_empty());
}

#[tokio::test]
async fn test_read_timeout_closes_silent_client() {
    let (access_log, log) = AccessLog::memory();
    let ctx = ServerContext::new(".", MimeRegistry::default(), access_log)
        .with_read_timeout(Some(Duration::from_millis(50)));
    let (mut client, server) = tokio::io::duplex(1024);

    Connection::new(server, Arc::new(ctx)).run().await.unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    assert!(response.is_empty());
    assert!(log.lines().is_empty());
}

#[tokio::test]
async fn test_serve_file_open_failure_writes_nothing() {
    let mut out = Vec::new();

    let result = serve_file(
        &mut ResponseWriter::new(&mut out),
        Path::new("/definitely/not/here.txt"),
        "text/plain",
        false,
    )
    .await;

    assert!(matches!(result, Err(ServeError::Rejected(RequestError::OpenError(_)))));
    assert!(out.is_empty());
}
