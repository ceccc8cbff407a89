//! Local fixa API stand-in for driving the binary

#![allow(dead_code)]

use assert_cmd::Command;
use assert_cmd::cargo;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

/// Method, path and body of a request the server received
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Answers POST with `create` and every GET with the next entry of
/// `statuses`, repeating the last one. Status replies are 200 unless started
/// with [`FixaServer::start_with_status_code`].
pub struct FixaServer {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FixaServer {
    pub fn start(create: (u16, &str), statuses: &[&str]) -> Self {
        Self::spawn(create, statuses.iter().map(|s| (200, s.to_string())).collect())
    }

    /// Every status request gets `code` with `body`
    pub fn start_with_status_code(create: (u16, &str), code: u16, body: &str) -> Self {
        Self::spawn(create, vec![(code, body.to_string())])
    }

    fn spawn(create: (u16, &str), statuses: Vec<(u16, String)>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("http server");
        let base_url = format!("http://{}", server.server_addr());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let create = (create.0, create.1.to_string());
        let log = Arc::clone(&seen);
        let stopped = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let mut polls = 0usize;
            while !stopped.load(Ordering::SeqCst) {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_millis(50)) else {
                    continue;
                };
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let method = request.method().to_string();

                let (code, reply) = if method == "POST" {
                    create.clone()
                } else {
                    let index = polls.min(statuses.len().saturating_sub(1));
                    polls += 1;
                    statuses
                        .get(index)
                        .cloned()
                        .unwrap_or((404, String::new()))
                };
                log.lock().unwrap().push(Seen {
                    method,
                    path: request.url().to_string(),
                    body,
                });

                let response = Response::from_string(reply)
                    .with_status_code(code)
                    .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            seen,
            stop,
            handle: Some(handle),
        }
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    /// Binary with a clean environment pointed at this server
    pub fn command(&self) -> Command {
        let mut cmd = fixa_ci();
        cmd.env("FIXA_BASE_URL", &self.base_url)
            .env("FIXA_API_BASE_URL", format!("{}/api/v1", self.base_url))
            .env("FIXA_POLL_INTERVAL_SECS", "1");
        cmd
    }
}

impl Drop for FixaServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Binary with no inherited environment
pub fn fixa_ci() -> Command {
    let mut cmd = cargo::cargo_bin_cmd!("fixa-ci");
    cmd.env_clear();
    cmd
}
