//! Common test utilities for punks integration tests
//!
//! [`StubServer`] is a minimal HTTP/1.1 server on a loopback port that replays
//! scripted responses and records what it received, so provider and reachability
//! code can be exercised without reaching the real services.

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// One scripted reply.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl StubResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            delay: None,
        }
    }

    /// Alchemy-shaped metadata body with `image.cachedUrl` set.
    pub fn metadata(cached_url: &str) -> Self {
        Self::json(200, serde_json::json!({ "image": { "cachedUrl": cached_url } }))
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// What the stub saw for one request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Loopback HTTP server replaying `responses` in order; the last one repeats.
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    pub async fn start(responses: Vec<StubResponse>) -> Result<Self> {
        anyhow::ensure!(!responses.is_empty(), "stub needs at least one response");

        let listener =
            TcpListener::bind("127.0.0.1:0").await.context("Failed to bind stub server")?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responses = Arc::new(responses);
        let served = Arc::new(AtomicUsize::new(0));

        let recorded = Arc::clone(&requests);
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let index = served.fetch_add(1, Ordering::SeqCst).min(responses.len() - 1);
                let response = responses[index].clone();
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let _ = serve(stream, response, recorded).await;
                });
            }
        });

        Ok(Self {
            addr,
            requests,
            handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    response: StubResponse,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) -> Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buffer.windows(4).any(|window| window == b"\r\n\r\n") {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let head = String::from_utf8_lossy(&buffer);
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();
    let headers = lines
        .take_while(|line| !line.is_empty())
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let is_head = method == "HEAD";
    if let Ok(mut guard) = recorded.lock() {
        guard.push(RecordedRequest {
            method,
            target,
            headers,
        });
    }

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let mut reply = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.body.len()
    );
    if !is_head {
        reply.push_str(&response.body);
    }
    stream.write_all(reply.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// `punks` binary with an isolated environment pointed at `data_dir`.
pub fn punks_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("punks").expect("punks binary is built for tests");
    cmd.current_dir(data_dir)
        .env_remove("ALCHEMY_API_KEY")
        .env_remove("PUNKS_IMAGE_SOURCE")
        .env_remove("PUNKS_CONFIG_PATH")
        .env_remove("PUNKS_DATA_DIR")
        .env_remove("RUST_LOG")
        .arg("--no-progress")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}
