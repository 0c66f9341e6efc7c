//! Mock Bankish backend for testing
//!
//! A tiny HTTP server on a raw `TcpListener` that answers the routes the
//! client uses, under the `/api` prefix:
//! - GET /accounts, /auth/me, /transactions, /cards, /dashboard/stats, /admin/users
//! - POST /transactions/transfer, /admin/transactions
//! - PATCH /admin/accounts/{id}
//!
//! Tokens starting with `valid_` are accepted. Every request is counted
//! per route and the last request body is kept for assertions.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value as JsonValue};

/// Mock server behaviour
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Answer every request with 401
    pub fail_auth: bool,
    /// Answer every request with 500
    pub server_error: bool,
    /// Reject transfers with 400 and this message
    pub reject_transfer: Option<String>,
    /// Role reported by /auth/me
    pub role: String,
    /// Confirmation code reported by /auth/me
    pub awc_code: Option<String>,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fail_auth: false,
            server_error: false,
            reject_transfer: None,
            role: "user".to_string(),
            awc_code: Some("1234".to_string()),
            delay_ms: 0,
        }
    }
}

#[derive(Debug, Default)]
struct Recorded {
    hits: HashMap<String, usize>,
    last_body: Option<JsonValue>,
}

/// Mock Bankish server
pub struct MockBackend {
    port: u16,
    running: Arc<AtomicBool>,
    recorded: Arc<Mutex<Recorded>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockBackend {
    /// Start on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let recorded = Arc::new(Mutex::new(Recorded::default()));

        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let recorded_clone = recorded.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let rec = recorded_clone.clone();
                        thread::spawn(move || handle_connection(stream, &cfg, &rec));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            recorded,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}/api", self.port)
    }

    /// Requests seen for `"METHOD /path"` (path without the `/api` prefix)
    pub fn hits(&self, route: &str) -> usize {
        self.recorded
            .lock()
            .map(|r| r.hits.get(route).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn last_body(&self) -> Option<JsonValue> {
        self.recorded.lock().ok().and_then(|r| r.last_body.clone())
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read headers, then as much body as Content-Length announces
fn read_request(stream: &mut TcpStream) -> Option<(String, String)> {
    let _ = stream.set_nonblocking(false);
    let mut data = Vec::new();
    let mut buffer = [0u8; 4096];

    loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let head = text[..header_end].to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let lower = l.to_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .and_then(|v| v.trim().parse::<usize>().ok())
                })
                .unwrap_or(0);
            let body_start = header_end + 4;
            if data.len() >= body_start + content_length {
                let body = String::from_utf8_lossy(&data[body_start..body_start + content_length]).to_string();
                return Some((head, body));
            }
        }
    }
    None
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, recorded: &Mutex<Recorded>) {
    let Some((head, body)) = read_request(&mut stream) else {
        return;
    };

    if config.delay_ms > 0 {
        thread::sleep(std::time::Duration::from_millis(config.delay_ms));
    }

    let first_line = head.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", r#"{"message": "Invalid request"}"#);
        return;
    }

    let method = parts[0];
    let path = parts[1].split('?').next().unwrap_or(parts[1]);
    let path = path.strip_prefix("/api").unwrap_or(path);

    if let Ok(mut rec) = recorded.lock() {
        *rec.hits.entry(format!("{} {}", method, path)).or_insert(0) += 1;
        if !body.is_empty() {
            rec.last_body = serde_json::from_str(&body).ok();
        }
    }

    let has_valid_auth = head.to_lowercase().contains("authorization: bearer valid_");
    if config.fail_auth || !has_valid_auth {
        send_response(&mut stream, 401, "Unauthorized", r#"{"message": "Invalid token"}"#);
        return;
    }

    if config.server_error {
        send_response(
            &mut stream,
            500,
            "Internal Server Error",
            r#"{"message": "Something went wrong"}"#,
        );
        return;
    }

    let response = match (method, path) {
        ("GET", "/accounts") => json!([
            {"_id": "acc-1", "accountType": "checking", "accountNumber": "1000200030004001",
             "balance": 2500.75, "status": "active", "createdAt": "2024-01-02T10:00:00.000Z"},
            {"_id": "acc-2", "accountType": "savings", "accountNumber": "1000200030004002",
             "balance": "10000", "status": "active", "createdAt": "2024-01-02T10:00:00.000Z"}
        ]),
        ("GET", "/auth/me") => json!({
            "_id": "user-1", "firstName": "Ada", "lastName": "Lovelace",
            "email": "ada@example.com", "role": config.role, "awcCode": config.awc_code
        }),
        ("GET", "/transactions") => json!([
            {"_id": "tx-1", "type": "deposit", "amount": 1200, "description": "Salary",
             "status": "completed", "createdAt": "2024-02-01T09:00:00.000Z"},
            {"_id": "tx-2", "type": "transfer", "amount": 45.5, "description": "Dinner",
             "recipientName": "Grace Hopper", "status": "pending", "createdAt": "2024-02-03T19:30:00.000Z"}
        ]),
        ("GET", "/cards") => json!([
            {"_id": "card-1", "cardType": "debit", "cardNumber": "4111111111111111",
             "expiryDate": "12/27", "status": "active"},
            {"_id": "card-2", "cardType": "credit", "cardNumber": "5500000000000004",
             "expiryDate": "08/26", "status": "blocked", "creditLimit": 5000}
        ]),
        ("GET", "/dashboard/stats") => json!({
            "totalBalance": 12500.75, "accountCount": 2, "monthlySpending": 845.2,
            "recentTransactions": [
                {"_id": "tx-1", "type": "deposit", "amount": 1200, "description": "Salary",
                 "status": "completed", "createdAt": "2024-02-01T09:00:00.000Z"}
            ]
        }),
        ("GET", "/admin/users") => json!([
            {"_id": "user-1", "firstName": "Ada", "lastName": "Lovelace", "email": "ada@example.com",
             "accounts": [{"_id": "acc-1", "accountType": "checking",
                           "accountNumber": "1000200030004001", "balance": 2500.75}]}
        ]),
        ("POST", "/transactions/transfer") => {
            if let Some(message) = &config.reject_transfer {
                let body = json!({ "message": message }).to_string();
                send_response(&mut stream, 400, "Bad Request", &body);
                return;
            }
            json!({"message": "Transfer successful"})
        }
        ("POST", "/admin/transactions") => json!({"message": "Transaction added"}),
        ("PATCH", p) if p.starts_with("/admin/accounts/") => json!({"message": "Balance updated"}),
        _ => {
            send_response(&mut stream, 404, "Not Found", r#"{"message": "Endpoint not found"}"#);
            return;
        }
    };

    send_response(&mut stream, 200, "OK", &response.to_string());
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}
