//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves checkpoint bodies under `/models/<name>` and imitates the cloud-drive
//! flow under `/uc?id=<id>`: ids registered as direct come back as an
//! attachment, ids registered as large first get a confirmation page that
//! sets a cookie and posts to `/download`.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct Routes {
    /// `/models/<name>` bodies.
    pub models: HashMap<String, Vec<u8>>,
    /// Cloud-drive ids served without a confirmation page.
    pub drive_direct: HashMap<String, Vec<u8>>,
    /// Cloud-drive ids that need confirmation first.
    pub drive_large: HashMap<String, Vec<u8>>,
}

pub struct Server {
    /// e.g. "http://127.0.0.1:12345/"
    pub base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Server {
    /// Request targets seen so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts the server on a background thread; it runs until the process exits.
pub fn start(routes: Routes) -> Server {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let seen = Arc::clone(&seen);
            thread::spawn(move || handle(stream, &routes, &seen));
        }
    });
    Server {
        base: format!("http://127.0.0.1:{}/", port),
        requests,
    }
}

fn handle(mut stream: TcpStream, routes: &Routes, seen: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf).into_owned();
    let (target, cookie) = parse_request(&request);
    seen.lock().unwrap().push(target.clone());

    let (path, query) = target.split_once('?').unwrap_or((target.as_str(), ""));
    let params: HashMap<&str, &str> = query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .collect();

    if let Some(name) = path.strip_prefix("/models/") {
        match routes.models.get(name) {
            Some(body) => respond(&mut stream, "200 OK", &[("Content-Type", "application/octet-stream")], body),
            None => respond(&mut stream, "404 Not Found", &[], b"not found"),
        }
        return;
    }

    let id = params.get("id").copied().unwrap_or("");
    match path {
        "/uc" => {
            if let Some(body) = routes.drive_direct.get(id) {
                attachment(&mut stream, id, body);
            } else if routes.drive_large.contains_key(id) {
                let page = format!(
                    concat!(
                        "<html><body><p>Google Drive can't scan this file for viruses.</p>",
                        "<form id=\"download-form\" action=\"/download\" method=\"get\">",
                        "<input type=\"submit\" value=\"Download anyway\"/>",
                        "<input type=\"hidden\" name=\"id\" value=\"{}\">",
                        "<input type=\"hidden\" name=\"confirm\" value=\"t\">",
                        "</form></body></html>"
                    ),
                    id
                );
                respond(
                    &mut stream,
                    "200 OK",
                    &[
                        ("Content-Type", "text/html; charset=utf-8"),
                        ("Set-Cookie", "download_warning=ok; Path=/"),
                    ],
                    page.as_bytes(),
                );
            } else if id == "blocked" {
                respond(
                    &mut stream,
                    "200 OK",
                    &[("Content-Type", "text/html")],
                    b"<html><body>Too many users have viewed or downloaded this file recently.</body></html>",
                );
            } else {
                respond(&mut stream, "404 Not Found", &[], b"not found");
            }
        }
        "/download" => match routes.drive_large.get(id) {
            Some(body)
                if params.get("confirm") == Some(&"t")
                    && cookie.contains("download_warning=ok") =>
            {
                attachment(&mut stream, id, body)
            }
            _ => respond(&mut stream, "403 Forbidden", &[], b"forbidden"),
        },
        _ => respond(&mut stream, "404 Not Found", &[], b"not found"),
    }
}

fn attachment(stream: &mut TcpStream, id: &str, body: &[u8]) {
    let disposition = format!("attachment; filename=\"{}.pth\"", id);
    respond(
        stream,
        "200 OK",
        &[
            ("Content-Type", "application/octet-stream"),
            ("Content-Disposition", &disposition),
        ],
        body,
    );
}

fn respond(stream: &mut TcpStream, status: &str, headers: &[(&str, &str)], body: &[u8]) {
    let mut head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        body.len()
    );
    for (k, v) in headers {
        head.push_str(&format!("{}: {}\r\n", k, v));
    }
    head.push_str("\r\n");
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

/// Returns (request target, Cookie header value or "").
fn parse_request(request: &str) -> (String, String) {
    let mut lines = request.lines();
    let target = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .unwrap_or("")
        .to_string();
    let mut cookie = String::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("cookie") {
                cookie = value.trim().to_string();
            }
        }
    }
    (target, cookie)
}
