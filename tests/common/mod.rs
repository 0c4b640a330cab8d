//! Common test utilities

#![allow(dead_code)]

use http_facade::{Headers, Response, Result};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Status and body text of a finished call
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

/// Build a header map from literal pairs
pub fn headers(pairs: &[(&str, &str)]) -> Headers {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Drain a response into a [`Reply`]
pub fn read(result: Result<Response>) -> Reply {
    let mut response = result.expect("request failed");
    let status = response.status().as_u16();
    let body = response
        .body_mut()
        .read_to_string()
        .expect("Failed to read response body");
    Reply { status, body }
}

/// Mock server answering every request with 200 and the request body
pub async fn echo_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(|req: &Request| ResponseTemplate::new(200).set_body_bytes(req.body.clone()))
        .mount(&server)
        .await;
    server
}

/// Run a blocking client call off the async runtime
pub async fn blocking<F, T>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .expect("blocking task panicked")
}

/// Value of a header on a recorded request
pub fn header<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers.get(name).and_then(|v| v.to_str().ok())
}

/// Every request the server has seen so far
pub async fn recorded(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording is disabled")
}
