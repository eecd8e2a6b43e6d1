//! Minimal one-shot HTTP server for exercising the transport end to end.

#![allow(dead_code)]

use resetflow_core::config::ResetflowConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// What the fake server saw.
#[derive(Debug)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Canned answer for one request.
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub chunked: bool,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
            chunked: false,
        }
    }

    pub fn html(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/html",
            body: body.to_string(),
            chunked: false,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: String::new(),
            chunked: false,
        }
    }

    /// JSON answer sent with chunked transfer encoding and no length header.
    pub fn chunked_json(status: u16, body: &str) -> Self {
        Self {
            chunked: true,
            ..Self::json(status, body)
        }
    }
}

pub fn config_for(addr: SocketAddr) -> ResetflowConfig {
    let mut cfg = ResetflowConfig::default();
    cfg.server.base_url = format!("http://{addr}");
    cfg
}

/// Serve `replies` to consecutive connections, one request each.
pub async fn serve(replies: Vec<Reply>) -> (SocketAddr, JoinHandle<Vec<Recorded>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for reply in replies {
            let (mut stream, _) = listener.accept().await.unwrap();
            seen.push(read_request(&mut stream).await);
            write_reply(&mut stream, &reply).await;
        }
        seen
    });
    (addr, handle)
}

/// Accept one connection and never answer it.
pub async fn serve_silently(hold: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            tokio::time::sleep(hold).await;
            drop(stream);
        }
    });
    addr
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

async fn read_request(stream: &mut TcpStream) -> Recorded {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let read = stream.read(&mut chunk).await.unwrap();
        assert!(read > 0, "client closed before sending headers");
        buf.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap().split_whitespace();
    let method = request_line.next().unwrap().to_string();
    let path = request_line.next().unwrap().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .map(|(_, value)| value.parse::<usize>().unwrap())
        .unwrap_or(0);

    while buf.len() < header_end + length {
        let read = stream.read(&mut chunk).await.unwrap();
        assert!(read > 0, "client closed before sending the body");
        buf.extend_from_slice(&chunk[..read]);
    }

    let body_bytes = &buf[header_end..header_end + length];
    let body = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(body_bytes).unwrap()
    };

    Recorded {
        method,
        path,
        headers,
        body,
    }
}

async fn write_reply(stream: &mut TcpStream, reply: &Reply) {
    let (framing, body) = if reply.chunked {
        (
            "Transfer-Encoding: chunked".to_string(),
            format!("{:x}\r\n{}\r\n0\r\n\r\n", reply.body.len(), reply.body),
        )
    } else {
        (
            format!("Content-Length: {}", reply.body.len()),
            reply.body.clone(),
        )
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\n{}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason(reply.status),
        reply.content_type,
        framing,
        body
    );
    // The client may hang up early on bodies it refuses to read.
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    }
}
