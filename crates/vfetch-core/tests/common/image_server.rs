//! Minimal HTTP/1.1 GET server for integration tests.
//!
//! Routes map a path (query stripped) to a status and body; unknown paths
//! get the fallback response. Request heads are recorded for assertions.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

type Response = (u16, Vec<u8>);

#[derive(Default)]
struct State {
    routes: HashMap<String, Response>,
    fallback: Option<Response>,
    requests: Vec<String>,
}

#[derive(Clone)]
pub struct ImageServer {
    base_url: String,
    state: Arc<Mutex<State>>,
}

impl ImageServer {
    /// Starts a server in a background thread; it runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State::default()));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let shared = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &shared));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Base URL without trailing slash, e.g. `http://127.0.0.1:12345`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn route(&self, path: &str, status: u16, body: Vec<u8>) {
        let key = format!("/{}", path.trim_start_matches('/'));
        self.state.lock().unwrap().routes.insert(key, (status, body));
    }

    /// Response for any path without an explicit route.
    pub fn fallback(&self, status: u16, body: Vec<u8>) {
        self.state.lock().unwrap().fallback = Some((status, body));
    }

    /// Raw request heads received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = String::from_utf8_lossy(&buf[..n]).into_owned();
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    let path = path.split('?').next().unwrap_or("/").to_string();

    let (status, body) = {
        let mut st = state.lock().unwrap();
        st.requests.push(request.clone());
        st.routes
            .get(&path)
            .cloned()
            .or_else(|| st.fallback.clone())
            .unwrap_or((404, b"not found".to_vec()))
    };

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
