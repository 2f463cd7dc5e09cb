//! The seam between request building and the network.
//!
//! `Transport` sends one `HttpRequest` and returns the raw `HttpResponse`
//! whatever its status. Status interpretation belongs to the decoder, so
//! implementations must not turn 3xx/4xx/5xx into errors, nor follow
//! redirects. `UreqTransport` is the blocking implementation used by default.

use std::time::Duration;

use crate::error::TransportError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse, ResponseBody};

/// Executes a single request. Must be safe to share across threads.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn prepare<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
    timeout: Option<Duration>,
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    // Bounds connecting and waiting for the response head. Streaming the
    // body afterwards is not limited.
    if let Some(timeout) = timeout {
        builder = builder
            .config()
            .timeout_connect(Some(timeout))
            .timeout_recv_response(Some(timeout))
            .build();
    }
    builder
}

fn map_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::Io(err) => TransportError::from(err),
        other => TransportError::Http(other.to_string()),
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            headers,
            timeout,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => prepare(self.agent.get(&url), &headers, timeout).call(),
            HttpMethod::Head => prepare(self.agent.head(&url), &headers, timeout).call(),
            HttpMethod::Delete => prepare(self.agent.delete(&url), &headers, timeout).call(),
            HttpMethod::Post => {
                let builder = prepare(self.agent.post(&url), &headers, timeout);
                match body {
                    Some(bytes) => builder.send(&bytes[..]),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = prepare(self.agent.put(&url), &headers, timeout);
                match body {
                    Some(bytes) => builder.send(&bytes[..]),
                    None => builder.send_empty(),
                }
            }
        };
        let response = result.map_err(map_error)?;

        let status = response.status().as_u16();
        let mut response_headers = Headers::new();
        for (name, value) in response.headers() {
            response_headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let has_body = method != HttpMethod::Head && !matches!(status, 204 | 304);
        let body = has_body.then(|| ResponseBody::from_reader(response.into_body().into_reader()));

        Ok(HttpResponse::new(status, response_headers, body))
    }
}
