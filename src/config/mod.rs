//! Configuration module for req-capture.
//!
//! This module provides the capture configuration object, including:
//! - Tolerant construction from JSON text or a structured keyed bag
//! - Loading from files (TOML/JSON)
//! - Environment variable and CLI overrides
//!
//! # Example
//!
//! ```rust
//! use req_capture::config::Config;
//! use serde_json::json;
//!
//! let from_bag = Config::create_from(json!({"URL": "http://x", "Debug": true})).unwrap();
//! let from_text = Config::create_from(r#"{"URL":"http://x","Debug":true}"#).unwrap();
//! assert_eq!(from_bag, from_text);
//! ```

mod settings;

pub use settings::{
    CliArgs, Config, ConfigError, ConfigSource, BROWSER_PATH_KEY, DEBUG_KEY, DEFAULT_URL,
    ENV_PREFIX, URL_KEY,
};
