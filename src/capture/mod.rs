//! Request capture pipeline.
//!
//! # Submodules
//!
//! - [`model`] - Captured request records and their export form
//! - [`network`] - Browser network events and classification helpers
//! - [`store`] - Concurrent store of captured requests
//! - [`listener`] - Event handling and frontend notifications
//! - [`session`] - Browser session abstraction and the capture loop
//! - [`chromium`] - Chrome/Chromium session over the DevTools protocol
//! - [`export`] - Writing captured requests to disk

pub mod chromium;
pub mod export;
pub mod listener;
pub mod model;
pub mod network;
pub mod session;
pub mod store;

pub use chromium::ChromiumSession;
pub use export::{export_captures, ExportFormat};
pub use listener::{CaptureEvent, CaptureListener, CAPTURE_EVENT_NAME};
pub use model::{CaptureDocument, Data, Header, RequestInfo, Validator};
pub use network::{
    content_type_is_json, cookie_header, request_from_get, request_from_post, to_header, Cookie,
    Headers, NetworkEvent, NetworkRequest, NetworkResponse,
};
pub use session::{
    run_capture, stop_channel, BrowserSession, LaunchOptions, MockBrowserSession, StopHandle,
    StopSignal,
};
pub use store::CaptureStore;
