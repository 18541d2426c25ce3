//! Shared utilities for integration testing: a scriptable JSON-RPC node.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Every JSON body the node received, in arrival order.
pub type Requests = Arc<Mutex<Vec<Value>>>;

/// `{"jsonrpc":"2.0","id":..,"result":..}` for `request`.
#[allow(dead_code)]
pub fn rpc_result(request: &Value, result: &str) -> (u16, String) {
    let body = json!({"jsonrpc": "2.0", "id": request["id"], "result": result});
    (200, body.to_string())
}

/// `{"jsonrpc":"2.0","id":..,"error":{..}}` for `request`.
#[allow(dead_code)]
pub fn rpc_error(request: &Value, code: i64, message: &str) -> (u16, String) {
    let body = json!({
        "jsonrpc": "2.0",
        "id": request["id"],
        "error": {"code": code, "message": message}
    });
    (200, body.to_string())
}

/// Start a node on an ephemeral port. `handler` maps each parsed request
/// body to an HTTP status and response body.
pub async fn start_rpc_node<F>(handler: F) -> (SocketAddr, Requests)
where
    F: Fn(&Value) -> (u16, String) + Send + Sync + 'static,
{
    start_rpc_node_with_delay(Duration::ZERO, handler).await
}

/// Like [`start_rpc_node`], but every answer is held back by `delay`.
#[allow(dead_code)]
pub async fn start_rpc_node_with_delay<F>(delay: Duration, handler: F) -> (SocketAddr, Requests)
where
    F: Fn(&Value) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(handler);

    let seen = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        serve(socket, delay, handler.as_ref(), &seen).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, requests)
}

async fn serve<F>(mut socket: TcpStream, delay: Duration, handler: &F, seen: &Requests)
where
    F: Fn(&Value) -> (u16, String),
{
    let Some(body) = read_body(&mut socket).await else {
        return;
    };

    let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    seen.lock().unwrap().push(request.clone());
    let (status, body) = handler(&request);

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let status_text = match status {
        200 => "200 OK",
        400 => "400 Bad Request",
        429 => "429 Too Many Requests",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        _ => "200 OK",
    };
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Read one HTTP request and return its body.
async fn read_body(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(String::from_utf8_lossy(&buf[body_start..body_start + content_length]).into_owned())
}

/// Methods of the recorded requests, in order.
#[allow(dead_code)]
pub fn methods(requests: &Requests) -> Vec<String> {
    requests
        .lock()
        .unwrap()
        .iter()
        .map(|r| r["method"].as_str().unwrap_or_default().to_string())
        .collect()
}
