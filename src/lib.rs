//! # Req-Capture
//!
//! Opens a browser on a configured page and captures the JSON API requests
//! that page makes, so they can be inspected and replayed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use req_capture::{App, ChromiumSession, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::create_from(r#"{"URL":"https://example.com","Debug":true}"#)?;
//!     let app = App::new(config);
//!
//!     let session = ChromiumSession::launch(&app.launch_options()).await?;
//!     let running = app.open_browser(session);
//!
//!     tokio::signal::ctrl_c().await?;
//!     app.close_browser();
//!     let captured = running.await??;
//!     println!("captured {} requests", captured.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`config`]: The configuration object and its file/env/CLI loading
//! - [`logging`]: Tracing setup driven by the `Debug` flag
//! - [`capture`]: Network event classification, storage and the capture loop
//! - [`app`]: Controller that opens and closes capture sessions
//!
//! ## Configuration
//!
//! Configuration follows a precedence chain:
//! 1. Configuration file (TOML/JSON)
//! 2. Environment variables (`REQ_CAPTURE_*`)
//! 3. CLI arguments
//!
//! See [`config::Config`] for the wire shape.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Application controller for opening and closing capture sessions.
pub mod app;

/// Request capture: network events, storage, browser sessions.
pub mod capture;

/// Configuration object and loading from JSON, files, env, and CLI.
pub mod config;

/// Logging initialisation.
pub mod logging;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

pub use app::App;

pub use capture::{
    BrowserSession, CaptureDocument, CaptureEvent, CaptureStore, ChromiumSession, Cookie,
    ExportFormat, LaunchOptions, MockBrowserSession, NetworkEvent, NetworkRequest, NetworkResponse, RequestInfo,
};

pub use config::{CliArgs, Config, ConfigError, ConfigSource};

/// Prelude module for convenient imports.
///
/// ```rust
/// use req_capture::prelude::*;
/// ```
pub mod prelude {
    pub use crate::app::App;
    pub use crate::capture::{BrowserSession, CaptureEvent, RequestInfo};
    pub use crate::config::{CliArgs, Config, ConfigSource};
    pub use crate::{FULL_VERSION, NAME, VERSION};
}
