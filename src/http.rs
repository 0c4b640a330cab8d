//! Shared HTTP client
//!
//! Wraps a blocking `ureq` agent configured from [`ClientConfig`] and offers
//! GET/POST helpers that build a [`RequestSpec`] and send it. Every call
//! blocks the current thread until a response arrives or a timeout fires.

use crate::config::ClientConfig;
use crate::error::{HttpError, Result};
use crate::request::{Headers, Method, RequestBody, RequestSpec};
use serde::Serialize;
use std::sync::LazyLock;
use tracing::{debug, warn};
use ureq::tls::TlsConfig;

/// Response handed back to the caller; read the body then drop it
pub type Response = ureq::http::Response<ureq::Body>;

/// Process-wide client, built on first use from the default config
static HTTP_CLIENT: LazyLock<HttpClient> = LazyLock::new(HttpClient::default);

/// Get a reference to the shared client
#[inline]
pub fn global() -> &'static HttpClient {
    &HTTP_CLIENT
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

fn build_agent(config: &ClientConfig) -> ureq::Agent {
    if config.insecure_skip_verify {
        warn!("TLS certificate and hostname verification is disabled for this client");
    }

    let tls = TlsConfig::builder()
        .disable_verification(config.insecure_skip_verify)
        .build();

    ureq::Agent::config_builder()
        .timeout_connect(Some(config.connect_timeout()))
        .timeout_send_request(Some(config.write_timeout()))
        .timeout_send_body(Some(config.write_timeout()))
        .timeout_recv_response(Some(config.read_timeout()))
        .timeout_recv_body(Some(config.read_timeout()))
        // 4xx/5xx are responses, not failures
        .http_status_as_error(false)
        .tls_config(tls)
        .build()
        .new_agent()
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            agent: build_agent(&config),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request, retrying once if the connection could not be made
    pub fn execute(&self, spec: &RequestSpec) -> Result<Response> {
        debug!(method = %spec.method(), url = %spec.url(), "sending request");
        self.with_retry(|| self.dispatch(spec))
    }

    /// Run `attempt`, running it a second time only when the first failed
    /// before a connection existed and the config allows it
    fn with_retry<T>(&self, mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
        match attempt() {
            Err(err) if self.config.retry_on_connection_failure && err.is_connection_failure() => {
                debug!(error = %err, "connection failed, retrying once");
                attempt()
            }
            result => result,
        }
    }

    fn dispatch(&self, spec: &RequestSpec) -> Result<Response> {
        let url = spec.url().as_str();

        let result = match spec.method() {
            Method::Get => {
                let mut request = self.agent.get(url);
                for (name, value) in spec.headers_list() {
                    request = request.header(name.as_str(), value.as_str());
                }
                request.call()
            }
            Method::Post => {
                let body = spec.body();
                let body_type = body.and_then(RequestBody::content_type);

                let mut request = self.agent.post(url);
                for (name, value) in spec.headers_list() {
                    // The body's own media type wins over a caller-supplied one
                    if body_type.is_some() && name.eq_ignore_ascii_case("content-type") {
                        continue;
                    }
                    request = request.header(name.as_str(), value.as_str());
                }
                if let Some(content_type) = body_type {
                    request = request.content_type(content_type);
                }

                match body {
                    Some(body) => request.send(body.as_bytes()),
                    None => request.send_empty(),
                }
            }
        };

        result.map_err(|err| match HttpError::from(err) {
            HttpError::InvalidUrl { reason, .. } => HttpError::InvalidUrl {
                url: url.to_string(),
                reason,
            },
            other => other,
        })
    }

    /// GET with no extra headers
    pub fn get(&self, url: &str) -> Result<Response> {
        self.execute(&RequestSpec::get(url)?)
    }

    pub fn get_with_headers(&self, url: &str, headers: &Headers) -> Result<Response> {
        self.execute(&RequestSpec::get(url)?.headers(headers)?)
    }

    /// GET with `params` appended to the URL's query string
    pub fn get_with_params<I, K, V>(
        &self,
        url: &str,
        headers: &Headers,
        params: I,
    ) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.execute(&RequestSpec::get(url)?.headers(headers)?.query(params))
    }

    /// POST raw JSON text with no extra headers
    pub fn post_json(&self, url: &str, json: &str) -> Result<Response> {
        self.post_json_with_headers(url, None, json)
    }

    /// POST an empty JSON-typed body
    pub fn post_empty(&self, url: &str, headers: &Headers) -> Result<Response> {
        self.post_json_with_headers(url, Some(headers), "")
    }

    /// POST a prebuilt body
    pub fn post_body(&self, url: &str, headers: &Headers, body: RequestBody) -> Result<Response> {
        self.execute(&RequestSpec::post(url, body)?.headers(headers)?)
    }

    /// POST `params` as an `application/x-www-form-urlencoded` body
    pub fn post_form<I, K, V>(
        &self,
        url: &str,
        headers: Option<&Headers>,
        params: I,
    ) -> Result<Response>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut spec = RequestSpec::post(url, RequestBody::form(params))?;
        if let Some(headers) = headers {
            spec = spec.headers(headers)?;
        }
        self.execute(&spec)
    }

    /// POST raw JSON text; absent headers behave like an empty map
    pub fn post_json_with_headers(
        &self,
        url: &str,
        headers: Option<&Headers>,
        json: &str,
    ) -> Result<Response> {
        let spec = RequestSpec::post(url, RequestBody::json(json))?
            .headers(headers.into_iter().flatten())?;
        self.execute(&spec)
    }

    /// POST `value` serialized as JSON
    pub fn post_serialized<T: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: Option<&Headers>,
        value: &T,
    ) -> Result<Response> {
        let json = serde_json::to_string(value)?;
        self.post_json_with_headers(url, headers, &json)
    }
}
