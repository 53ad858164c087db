//! In-memory [`Transport`] for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use common::ApiError;
use http::Method;
use serde_json::{json, Value};
use tokio::sync::Barrier;

use super::{ApiRequest, Transport, TransportError};

/// Serves one public key on GET and records every POST.
pub(crate) struct FakeTransport {
    pem: Mutex<String>,
    key_fetches: AtomicUsize,
    fail_key_fetch: bool,
    gate: Option<Barrier>,
    posted: Mutex<Vec<ApiRequest>>,
    post_response: Value,
}

impl FakeTransport {
    pub(crate) fn with_key(pem: &str) -> Self {
        Self {
            pem: Mutex::new(pem.to_owned()),
            key_fetches: AtomicUsize::new(0),
            fail_key_fetch: false,
            gate: None,
            posted: Mutex::new(Vec::new()),
            post_response: json!({"ok": true}),
        }
    }

    /// Key fetches answer 503.
    pub(crate) fn failing_key_fetch(mut self) -> Self {
        self.fail_key_fetch = true;
        self
    }

    /// Hold every key fetch until `n` of them are in flight.
    pub(crate) fn gated(mut self, n: usize) -> Self {
        self.gate = Some(Barrier::new(n));
        self
    }

    pub(crate) fn with_post_response(mut self, response: Value) -> Self {
        self.post_response = response;
        self
    }

    pub(crate) fn set_key(&self, pem: &str) {
        *self.pem.lock().unwrap() = pem.to_owned();
    }

    pub(crate) fn key_fetches(&self) -> usize {
        self.key_fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn posted(&self) -> Vec<ApiRequest> {
        self.posted.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        if request.method == Method::GET {
            if let Some(gate) = &self.gate {
                gate.wait().await;
            }
            self.key_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_key_fetch {
                return Err(ApiError::Server { status: 503 }.into());
            }
            let pem = self.pem.lock().unwrap().clone();
            return Ok(json!({"public_key": pem, "algorithm": "RSA"}));
        }

        self.posted.lock().unwrap().push(request);
        Ok(self.post_response.clone())
    }
}
