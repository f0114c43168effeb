//! Minimal HTTP server for transport and end-to-end tests.
//!
//! Serves one canned response per connection, in order. Once the script is
//! exhausted the last response repeats.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub(crate) enum StubResponse {
    Json { status: u16, body: String },
    /// Accept the request and never answer.
    Hang,
}

impl StubResponse {
    pub(crate) fn json(status: u16, body: &str) -> Self {
        StubResponse::Json {
            status,
            body: body.to_string(),
        }
    }
}

pub(crate) struct StubServer {
    addr: std::net::SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    accept_loop: tokio::task::JoinHandle<()>,
}

impl StubServer {
    pub(crate) async fn start(script: Vec<StubResponse>) -> Self {
        assert!(!script.is_empty(), "stub server needs at least one response");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let accept_loop = tokio::spawn(async move {
            let mut served = 0usize;
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let response = script[served.min(script.len() - 1)].clone();
                served += 1;
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    serve(stream, response, recorded).await;
                });
            }
        });

        Self {
            addr,
            requests,
            accept_loop,
        }
    }

    pub(crate) fn url(&self) -> String {
        format!("http://{}/generate", self.addr)
    }

    /// Raw text of every request received so far.
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.accept_loop.abort();
    }
}

async fn serve(mut stream: TcpStream, response: StubResponse, recorded: Arc<Mutex<Vec<String>>>) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    recorded.lock().unwrap().push(request);

    match response {
        StubResponse::Json { status, body } => {
            let raw = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(raw.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        StubResponse::Hang => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.trim()
                        .eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                return Some(String::from_utf8_lossy(&buf).into_owned());
            }
        }
    }
}
