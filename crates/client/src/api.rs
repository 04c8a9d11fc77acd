//! The request wrapper every endpoint call goes through.
//!
//! Resolves paths against the configured base address, merges default and
//! caller headers, and normalizes failures into [`HrdeskError`]:
//!
//! - no response at all → `Transport`
//! - non-success status → `Request { status, message }`, message taken from
//!   the error body when it has one
//! - success body that is not the expected JSON → `Decode`

use crate::config::ClientConfig;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use hrdesk_core::error::{HrdeskError, HrdeskResult, REQUEST_FAILED_MESSAGE, UNKNOWN_ERROR_MESSAGE};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Per-request method, body, and header overrides.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Vec<u8>>,
    /// Merged over the defaults; a name present here replaces the default.
    pub headers: HeaderMap,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: HeaderMap::new(),
        }
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Serializes `body` as the JSON request body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> HrdeskResult<Self> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| HrdeskError::InvalidInput(format!("request body is not serializable: {e}")))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Uses an already-serialized body verbatim.
    pub fn raw_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport>,
    bearer_token: Option<String>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.config.base_url())
            .field("authenticated", &self.bearer_token.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Client over a real HTTP connection pool.
    pub fn new(config: ClientConfig) -> HrdeskResult<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        tracing::info!(base_url = config.base_url(), timeout_s = config.timeout.as_secs(), "api client ready");
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            bearer_token: None,
        }
    }

    /// A client sharing this one's transport that sends
    /// `Authorization: Bearer <token>` by default (or nothing, for `None`).
    pub fn with_bearer_token(&self, token: Option<String>) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
            bearer_token: token,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// Issues a request and decodes the JSON body.
    ///
    /// `Ok(None)` means the server answered `204 No Content`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> HrdeskResult<Option<T>> {
        let method = options.method.clone();
        let resp = self.dispatch(path, options).await?;

        if resp.status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        serde_json::from_slice(&resp.body).map(Some).map_err(|e| {
            tracing::warn!(%method, path, status = resp.status.as_u16(), error = %e, "undecodable response body");
            HrdeskError::Decode(format!("{method} {path}: {e}"))
        })
    }

    /// Like [`request`](Self::request), but a body is mandatory.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> HrdeskResult<T> {
        let method = options.method.clone();
        self.request(path, options)
            .await?
            .ok_or_else(|| HrdeskError::Decode(format!("{method} {path}: expected a body, got 204 No Content")))
    }

    /// Issues a request whose success body, if any, is irrelevant.
    pub async fn execute(&self, path: &str, options: RequestOptions) -> HrdeskResult<()> {
        self.dispatch(path, options).await.map(|_| ())
    }

    /// Sends the request and turns non-success statuses into errors.
    async fn dispatch(&self, path: &str, options: RequestOptions) -> HrdeskResult<HttpResponse> {
        let RequestOptions { method, body, headers: overrides } = options;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| HrdeskError::InvalidInput("session token is not a valid header value".into()))?;
            headers.insert(AUTHORIZATION, value);
        }
        // Replaces every default whose name the caller also set.
        headers.extend(overrides);

        let url = self.config.url_for(path);
        tracing::debug!(%method, %url, has_body = body.is_some(), "request");

        let resp = self
            .transport
            .send(HttpRequest {
                method: method.clone(),
                url,
                headers,
                body,
            })
            .await
            .inspect_err(|e| tracing::warn!(%method, path, error = %e, "transport failure"))?;

        if resp.status.is_success() {
            tracing::debug!(%method, path, status = resp.status.as_u16(), bytes = resp.body.len(), "response");
            return Ok(resp);
        }

        let message = error_message(&resp.body);
        tracing::warn!(%method, path, status = resp.status.as_u16(), reason = %message, "request failed");
        Err(HrdeskError::Request {
            status: resp.status.as_u16(),
            message,
        })
    }
}

/// Best-effort human-readable message from a failure body.
///
/// Looks at `message`, then `error`; a JSON body with neither yields a
/// generic failure, a body that is not JSON at all yields "unknown error".
pub fn error_message(body: &[u8]) -> String {
    let parsed: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => return UNKNOWN_ERROR_MESSAGE.to_string(),
    };

    ["message", "error"]
        .iter()
        .find_map(|key| parsed.get(key).and_then(Value::as_str).filter(|m| !m.is_empty()))
        .unwrap_or(REQUEST_FAILED_MESSAGE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::ScriptedTransport;
    use serde_json::json;

    fn client(transport: &Arc<ScriptedTransport>) -> ApiClient {
        let config = ClientConfig::new("http://hr.test/api/v1").unwrap();
        ApiClient::with_transport(config, transport.clone())
    }

    #[tokio::test]
    async fn get_decodes_json_and_defaults_headers() {
        let t = ScriptedTransport::new();
        t.push_json(StatusCode::OK, json!([{ "id": "A" }]));

        let body: Option<Value> = client(&t).request("/employees", RequestOptions::default()).await.unwrap();
        assert_eq!(body, Some(json!([{ "id": "A" }])));

        let sent = t.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::GET);
        assert_eq!(sent[0].url, "http://hr.test/api/v1/employees");
        assert_eq!(sent[0].headers[CONTENT_TYPE], "application/json");
        assert!(sent[0].headers.get(AUTHORIZATION).is_none());
        assert!(sent[0].body.is_none());
    }

    #[tokio::test]
    async fn caller_headers_win() {
        let t = ScriptedTransport::new();
        t.push_json(StatusCode::OK, json!({}));

        let opts = RequestOptions::post()
            .raw_body("a=1")
            .header(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"))
            .header(HeaderName::from_static("x-request-id"), HeaderValue::from_static("r-1"));
        let _: Option<Value> = client(&t).request("/echo", opts).await.unwrap();

        let sent = &t.requests()[0];
        assert_eq!(sent.headers.get_all(CONTENT_TYPE).iter().count(), 1);
        assert_eq!(sent.headers[CONTENT_TYPE], "application/x-www-form-urlencoded");
        assert_eq!(sent.headers["x-request-id"], "r-1");
        assert_eq!(sent.body.as_deref(), Some(&b"a=1"[..]));
    }

    #[tokio::test]
    async fn bearer_token_is_a_default_header() {
        let t = ScriptedTransport::new();
        t.push_json(StatusCode::OK, json!({}));
        t.push_json(StatusCode::OK, json!({}));

        let authed = client(&t).with_bearer_token(Some("T1".into()));
        assert!(authed.is_authenticated());
        let _: Option<Value> = authed.request("/me", RequestOptions::get()).await.unwrap();
        let overridden = RequestOptions::get().header(AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        let _: Option<Value> = authed.request("/me", overridden).await.unwrap();

        let sent = t.requests();
        assert_eq!(sent[0].headers[AUTHORIZATION], "Bearer T1");
        assert_eq!(sent[1].headers[AUTHORIZATION], "Basic xyz");
    }

    #[tokio::test]
    async fn no_content_is_empty_result() {
        let t = ScriptedTransport::new();
        t.push_no_content();
        let body: Option<Value> = client(&t).request("/employees/7", RequestOptions::delete()).await.unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn fetch_requires_a_body() {
        let t = ScriptedTransport::new();
        t.push_no_content();
        let err = client(&t).fetch::<Value>("/employees/7", RequestOptions::get()).await.unwrap_err();
        assert!(matches!(err, HrdeskError::Decode(_)), "{err:?}");
    }

    #[tokio::test]
    async fn failure_message_comes_from_body() {
        let t = ScriptedTransport::new();
        t.push_json(StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "db down" }));
        t.push_json(StatusCode::NOT_FOUND, json!({ "error": "record not found" }));

        let c = client(&t);
        let err = c.request::<Value>("/employees", RequestOptions::get()).await.unwrap_err();
        assert!(matches!(err, HrdeskError::Request { status: 500, .. }));
        assert_eq!(err.message(), "db down");

        let err = c.request::<Value>("/employees/x", RequestOptions::get()).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), "record not found");
    }

    #[tokio::test]
    async fn unreadable_failure_body_is_unknown_error() {
        let t = ScriptedTransport::new();
        t.push_raw(StatusCode::BAD_GATEWAY, "<html>502</html>");
        let err = client(&t).execute("/employees", RequestOptions::get()).await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.message(), UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn json_without_message_is_generic_failure() {
        assert_eq!(error_message(br#"{"code": 17}"#), REQUEST_FAILED_MESSAGE);
        assert_eq!(error_message(br#"{"message": ""}"#), REQUEST_FAILED_MESSAGE);
        assert_eq!(error_message(b"[1,2]"), REQUEST_FAILED_MESSAGE);
        assert_eq!(error_message(b""), UNKNOWN_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn invalid_success_body_is_decode_error() {
        let t = ScriptedTransport::new();
        t.push_raw(StatusCode::OK, "not json");
        let err = client(&t).request::<Value>("/employees", RequestOptions::get()).await.unwrap_err();
        assert!(matches!(err, HrdeskError::Decode(_)), "{err:?}");
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let t = ScriptedTransport::new();
        t.push_transport_error("connection refused");
        let err = client(&t).request::<Value>("/employees", RequestOptions::get()).await.unwrap_err();
        assert!(matches!(err, HrdeskError::Transport(ref m) if m.contains("connection refused")));
    }
}
