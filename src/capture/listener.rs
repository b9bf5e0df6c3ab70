//! Applies network events to a [`CaptureStore`] and announces captures.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::model::RequestInfo;
use super::network::{
    content_type_is_json, request_from_get, request_from_post, NetworkEvent, NetworkRequest,
    NetworkResponse, METHOD_GET, METHOD_POST,
};
use super::store::CaptureStore;

/// Name the frontend subscribes to for captured requests.
pub const CAPTURE_EVENT_NAME: &str = "capture requestInfo";

/// Events pushed to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CaptureEvent {
    /// A session navigated to its start URL.
    SessionStarted { url: String },

    /// A JSON response was matched to a recorded request.
    RequestCaptured { request: RequestInfo },

    /// A session stopped and finalized this many requests.
    SessionFinished { captured: usize },
}

impl CaptureEvent {
    /// Frontend event name.
    pub fn name(&self) -> &'static str {
        match self {
            CaptureEvent::SessionStarted { .. } => "session started",
            CaptureEvent::RequestCaptured { .. } => CAPTURE_EVENT_NAME,
            CaptureEvent::SessionFinished { .. } => "session finished",
        }
    }
}

/// Records requests and matches JSON responses to them.
#[derive(Debug, Clone)]
pub struct CaptureListener {
    store: CaptureStore,
    events: broadcast::Sender<CaptureEvent>,
}

impl CaptureListener {
    pub fn new(store: CaptureStore, events: broadcast::Sender<CaptureEvent>) -> Self {
        Self { store, events }
    }

    pub fn store(&self) -> &CaptureStore {
        &self.store
    }

    /// Sends an event to subscribers. Having none is not an error.
    pub fn emit(&self, event: CaptureEvent) {
        let _ = self.events.send(event);
    }

    /// Handles one network event.
    pub fn handle(&self, event: &NetworkEvent) {
        match event {
            NetworkEvent::RequestWillBeSent { request, .. } => self.on_request(request),
            NetworkEvent::ResponseReceived {
                request_id,
                response,
            } => self.on_response(request_id, response),
        }
    }

    fn on_request(&self, req: &NetworkRequest) {
        debug!(url = %req.url, method = %req.method, "request observed");

        match req.method.as_str() {
            METHOD_GET => {
                if let Some(info) = request_from_get(req) {
                    self.store.insert(req.url.clone(), info);
                }
            }
            METHOD_POST => {
                if content_type_is_json(&req.headers) {
                    self.store.insert(req.url.clone(), request_from_post(req));
                }
            }
            _ => {}
        }
    }

    fn on_response(&self, request_id: &str, resp: &NetworkResponse) {
        if !content_type_is_json(&resp.headers) {
            return;
        }

        let updated = self.store.update(&resp.url, |info| {
            info.validator.status_code = resp.status;
            info.request_id = request_id.to_string();
        });

        if let Some(request) = updated {
            info!(url = %request.url, method = %request.method, "request captured");
            self.emit(CaptureEvent::RequestCaptured { request });
        }
    }
}
