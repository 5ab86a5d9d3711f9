//! Scripted transport for unit tests: replays queued responses and records
//! every request it was asked to send.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::http::{HttpRequest, HttpResponse, Transport, TransportError};

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    fallback: Mutex<Option<(u16, String)>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A transport that answers every request with the same status and
    /// JSON body.
    pub(crate) fn replying(status: u16, body: &str) -> Self {
        let transport = Self::new();
        transport.set_fallback(status, body);
        transport
    }

    /// A transport whose every send fails at the wire level.
    pub(crate) fn failing(message: &str) -> Self {
        let transport = Self::new();
        transport
            .responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError::new(message)));
        transport
    }

    pub(crate) fn push_response(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub(crate) fn push_json(&self, status: u16, body: &str) {
        self.push_response(HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        });
    }

    /// Drain and return every request sent so far.
    pub(crate) fn take_sent(&self) -> Vec<HttpRequest> {
        std::mem::take(&mut self.sent.lock().unwrap())
    }

    fn set_fallback(&self, status: u16, body: &str) {
        *self.fallback.lock().unwrap() = Some((status, body.to_string()));
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        if let Some(next) = self.responses.lock().unwrap().pop_front() {
            return next;
        }
        if let Some((status, body)) = self.fallback.lock().unwrap().clone() {
            return Ok(HttpResponse {
                status,
                headers: vec![("content-type".to_string(), "application/json".to_string())],
                body,
            });
        }
        Err(TransportError::new("no scripted response left"))
    }
}
