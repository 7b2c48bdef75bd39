//! Loopback HTTP stub standing in for the USGS IV endpoint.
//!
//! Each connection is answered on its own thread with `Connection: close`.
//! The handler receives the request path and returns (status, body, delay).

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl StubResponse {
    pub fn ok(body: String) -> Self {
        Self { status: 200, body, delay: Duration::ZERO }
    }
}

/// Starts the stub and returns its base URL, e.g. `http://127.0.0.1:40123`.
pub fn start_stub<F>(handler: F) -> String
where
    F: Fn(&str) -> StubResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let handler = Arc::new(handler);

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { continue };
            let handler = Arc::clone(&handler);
            std::thread::spawn(move || serve(stream, handler.as_ref()));
        }
    });

    format!("http://{}", addr)
}

fn serve(mut stream: TcpStream, handler: &(dyn Fn(&str) -> StubResponse + Send + Sync)) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    // Drain headers; a GET carries no body.
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) if line == "\r\n" || line == "\n" => break,
            Ok(_) => continue,
            Err(_) => return,
        }
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
    let response = handler(&path);
    std::thread::sleep(response.delay);

    let reason = if response.status == 200 { "OK" } else { "Error" };
    let raw = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        response.status,
        reason,
        response.body.len(),
        response.body
    );
    let _ = stream.write_all(raw.as_bytes());
    let _ = stream.flush();
}

/// Pulls `sites=<code>` out of a request path.
pub fn site_param(path: &str) -> String {
    path.split(['?', '&'])
        .find_map(|kv| kv.strip_prefix("sites="))
        .unwrap_or_default()
        .to_string()
}

/// Minimal IV body carrying `value` at the consumed path.
pub fn iv_body(value: &str) -> String {
    serde_json::json!({
        "value": {
            "timeSeries": [
                { "values": [ { "value": [ { "value": value, "qualifiers": ["P"] } ] } ] }
            ]
        }
    })
    .to_string()
}
