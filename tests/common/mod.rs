//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use pool_watcher::alerting::AlertIntent;
use pool_watcher::notifier::{DeliveryError, Notifier};
use pool_watcher::probe::{Probe, ProbeOutcome, ProbeResult};

/// What the mock proxy answers with.
#[derive(Debug, Clone)]
pub struct BackendReply {
    pub status: u16,
    pub pool: Option<String>,
    pub release: Option<String>,
    pub delay: Duration,
}

impl BackendReply {
    pub fn ok(pool: &str, release: &str) -> Self {
        Self {
            status: 200,
            pool: Some(pool.to_string()),
            release: Some(release.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        404 => "404 Not Found",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// Read one HTTP request (headers plus Content-Length body).
async fn read_request(socket: &mut TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
    Some((head, body))
}

/// Start a mock proxy whose replies are computed per request.
pub async fn start_pool_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = BackendReply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        if read_request(&mut socket).await.is_none() {
                            return;
                        }
                        let reply = f().await;
                        tokio::time::sleep(reply.delay).await;

                        let mut headers = String::new();
                        if let Some(pool) = &reply.pool {
                            headers.push_str(&format!("X-App-Pool: {}\r\n", pool));
                        }
                        if let Some(release) = &reply.release {
                            headers.push_str(&format!("X-Release-Id: {}\r\n", release));
                        }

                        let body = "ok";
                        let response_str = format!(
                            "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text(reply.status),
                            headers,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a webhook endpoint that forwards every received body.
pub async fn start_webhook_receiver(status: u16) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        if let Some((_, body)) = read_request(&mut socket).await {
                            let _ = tx.send(body);
                        }
                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                            status_text(status)
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Fixed base time so scripted runs are reproducible.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

/// Outcome `secs` seconds after [`base_time`].
pub fn outcome(secs: i64, result: ProbeResult, pool: Option<&str>) -> ProbeOutcome {
    let at = base_time() + chrono::Duration::seconds(secs);
    match result {
        ProbeResult::Success | ProbeResult::ServerError => ProbeOutcome::from_response(
            at,
            if result == ProbeResult::Success { 200 } else { 503 },
            pool.map(str::to_string),
            Some("v1".to_string()),
            Duration::from_millis(5),
        ),
        other => ProbeOutcome::failed(at, other, Duration::from_millis(5)),
    }
}

/// Replays a fixed list of outcomes, then keeps returning the last one.
pub struct ScriptedProbe {
    script: Mutex<VecDeque<ProbeOutcome>>,
    last: Mutex<Option<ProbeOutcome>>,
}

impl ScriptedProbe {
    pub fn new(script: Vec<ProbeOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    async fn probe(&self) -> ProbeOutcome {
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(outcome) => {
                *last = Some(outcome.clone());
                outcome
            }
            None => last
                .clone()
                .unwrap_or_else(|| outcome(0, ProbeResult::Success, Some("blue"))),
        }
    }
}

/// Captures every alert handed to it.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<AlertIntent>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn delivered(&self) -> Vec<AlertIntent> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn deliver(&self, alert: &AlertIntent) -> Result<(), DeliveryError> {
        self.delivered.lock().unwrap().push(alert.clone());
        if self.fail {
            return Err(DeliveryError::Status(500));
        }
        Ok(())
    }
}

/// Never completes within any reasonable delivery timeout.
pub struct HangingNotifier;

#[async_trait]
impl Notifier for HangingNotifier {
    fn name(&self) -> &'static str {
        "hanging"
    }

    async fn deliver(&self, _alert: &AlertIntent) -> Result<(), DeliveryError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }
}

/// Takes `delay` to deliver and signals `started` when a delivery begins.
pub struct SlowNotifier {
    pub delay: Duration,
    pub started: Arc<tokio::sync::Notify>,
}

#[async_trait]
impl Notifier for SlowNotifier {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn deliver(&self, _alert: &AlertIntent) -> Result<(), DeliveryError> {
        self.started.notify_one();
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

/// Answers "blue" after sleeping for `delay`.
pub struct SlowProbe {
    pub delay: Duration,
}

#[async_trait]
impl Probe for SlowProbe {
    async fn probe(&self) -> ProbeOutcome {
        tokio::time::sleep(self.delay).await;
        ProbeOutcome::from_response(Utc::now(), 200, Some("blue".to_string()), None, self.delay)
    }
}
