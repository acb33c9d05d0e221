/*!
Scripted HTTP server standing in for the backup server

Answers each request with the next status of its script, repeating the last
one once the script runs out. Every connection is closed after one response.
*/

use anyhow::Result;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct StubServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Bind on localhost and start answering with `statuses`.
    pub async fn start(statuses: impl IntoIterator<Item = u16>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let hits = Arc::new(AtomicUsize::new(0));
        let script = Arc::new(Mutex::new(statuses.into_iter().collect::<VecDeque<u16>>()));

        let handle = tokio::spawn({
            let hits = hits.clone();
            async move {
                let mut last = 503;
                while let Ok((stream, _)) = listener.accept().await {
                    let status = {
                        let mut script = script.lock().unwrap();
                        if let Some(next) = script.pop_front() {
                            last = next;
                        }
                        last
                    };
                    hits.fetch_add(1, Ordering::SeqCst);
                    if let Err(e) = respond(stream, status).await {
                        tracing::debug!("stub server connection error: {}", e);
                    }
                }
            }
        });

        Ok(Self { addr, hits, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Number of requests answered so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn respond(mut stream: TcpStream, status: u16) -> std::io::Result<()> {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
    }

    let body = if status == 200 { "ready" } else { "waking" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason_phrase(status),
        body.len(),
        body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}
