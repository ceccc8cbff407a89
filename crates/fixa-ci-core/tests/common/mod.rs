//! Scripted fixa API stand-in built on tiny_http

#![allow(dead_code)]

use fixa_ci_core::RunConfig;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Response, Server};

/// One request as the server saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Answers POST with the create response and every other request with the
/// next scripted status response, repeating the last one.
pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockServer {
    pub fn start(create: (u16, &str), statuses: Vec<(u16, &str)>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("http server");
        let base_url = format!("http://{}", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));

        let create = (create.0, create.1.to_string());
        let statuses: Vec<(u16, String)> = statuses
            .into_iter()
            .map(|(code, body)| (code, body.to_string()))
            .collect();

        let log = Arc::clone(&requests);
        let stopped = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let mut served_statuses = 0;
            while !stopped.load(Ordering::SeqCst) {
                let Ok(Some(mut request)) = server.recv_timeout(Duration::from_millis(50)) else {
                    continue;
                };

                let header = |name: &'static str| {
                    request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv(name))
                        .map(|h| h.value.as_str().to_string())
                };
                let mut recorded = RecordedRequest {
                    method: request.method().to_string(),
                    path: request.url().to_string(),
                    authorization: header("Authorization"),
                    content_type: header("Content-Type"),
                    body: String::new(),
                };
                request
                    .as_reader()
                    .read_to_string(&mut recorded.body)
                    .expect("read body");

                let (code, body) = if recorded.method == "POST" {
                    create.clone()
                } else {
                    let index = served_statuses.min(statuses.len().saturating_sub(1));
                    served_statuses += 1;
                    statuses
                        .get(index)
                        .cloned()
                        .unwrap_or((404, String::new()))
                };
                log.lock().unwrap().push(recorded);

                let response = Response::from_string(body)
                    .with_status_code(code)
                    .with_header(Header::from_bytes("Content-Type", "application/json").unwrap());
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            stop,
            handle: Some(handle),
        }
    }

    pub fn api_base_url(&self) -> String {
        format!("{}/api/v1", self.base_url)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Config pointing both base URLs at this server
    pub fn config(&self, time_limit_minutes: u64) -> RunConfig {
        RunConfig {
            api_key: "secret-key".to_string(),
            agent_id: "agent-1".to_string(),
            scenario_ids: None,
            test_agent_ids: None,
            time_limit_minutes,
            base_url: self.base_url.clone(),
            api_base_url: self.api_base_url(),
            poll_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
