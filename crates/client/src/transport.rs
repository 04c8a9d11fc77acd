//! Transport seam between the request wrapper and the network.
//!
//! [`ApiClient`](crate::ApiClient) builds fully-resolved [`HttpRequest`]s and
//! hands them to an [`HttpTransport`]. Production uses [`ReqwestTransport`];
//! tests swap in a scripted transport.

use async_trait::async_trait;
use hrdesk_core::error::{HrdeskError, HrdeskResult};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::time::Duration;

/// A request ready to go on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Whatever came back, before any interpretation of the status.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

/// Sends one request and returns the raw response.
///
/// Implementations report only transport-level failures (no response at
/// all) as errors; every status code is a successful `send`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> HrdeskResult<HttpResponse>;
}

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> HrdeskResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hrdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HrdeskError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> HrdeskResult<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| HrdeskError::Transport(format!("{method} {url}: {e}")))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| HrdeskError::Transport(format!("{method} {url}: reading body: {e}")))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
