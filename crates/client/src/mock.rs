//! Scripted in-memory transport for tests.
//!
//! Replies are consumed in FIFO order, one per request. A gated reply holds
//! its request open until the test releases it, which lets tests control the
//! order in which concurrent requests resolve.

use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use hrdesk_core::error::{HrdeskError, HrdeskResult};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

type Scripted = Result<HttpResponse, String>;

enum Reply {
    Ready(Scripted),
    Gated(oneshot::Receiver<Scripted>),
}

/// Releases one gated reply.
pub struct Gate {
    tx: oneshot::Sender<Scripted>,
}

impl Gate {
    pub fn json(self, status: StatusCode, body: Value) {
        self.release(Ok(HttpResponse {
            status,
            body: body.to_string().into_bytes(),
        }));
    }

    pub fn transport_error(self, message: &str) {
        self.release(Err(message.to_string()));
    }

    fn release(self, reply: Scripted) {
        // The request may already have been dropped; nothing to deliver then.
        let _ = self.tx.send(reply);
    }
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_json(&self, status: StatusCode, body: Value) {
        self.push_raw(status, body.to_string());
    }

    pub fn push_raw(&self, status: StatusCode, body: impl Into<Vec<u8>>) {
        self.push(Reply::Ready(Ok(HttpResponse {
            status,
            body: body.into(),
        })));
    }

    pub fn push_no_content(&self) {
        self.push_raw(StatusCode::NO_CONTENT, Vec::new());
    }

    pub fn push_transport_error(&self, message: &str) {
        self.push(Reply::Ready(Err(message.to_string())));
    }

    /// Queues a reply that is only delivered once the returned gate is released.
    pub fn push_gated(&self) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.push(Reply::Gated(rx));
        Gate { tx }
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Replies queued but not yet consumed.
    pub fn pending_replies(&self) -> usize {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn push(&self, reply: Reply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> HrdeskResult<HttpResponse> {
        let label = format!("{} {}", request.method, request.url);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        let scripted = match next {
            Some(Reply::Ready(r)) => r,
            Some(Reply::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(format!("gate for {label} was dropped"))),
            None => Err(format!("no scripted reply for {label}")),
        };

        scripted.map_err(HrdeskError::Transport)
    }
}
