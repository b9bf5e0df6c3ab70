//! Capture configuration object and its loading chain.
//!
//! [`Config`] is the small value shared between the backend and the frontend.
//! Every field is optional, and an absent field stays `None` rather than
//! collapsing to an empty string or `false`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Wire key of the target URL.
pub const URL_KEY: &str = "URL";

/// Wire key of the debug toggle.
pub const DEBUG_KEY: &str = "Debug";

/// Wire key of the browser executable path.
pub const BROWSER_PATH_KEY: &str = "BrowserPath";

/// URL opened when no configuration source provides one.
pub const DEFAULT_URL: &str = "https://studygolang.com/topics";

/// Prefix of all environment variable overrides.
pub const ENV_PREFIX: &str = "REQ_CAPTURE_";

/// Errors that can occur during configuration loading or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Textual input was not valid JSON.
    #[error("Failed to parse JSON configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Failed to read or write a configuration file.
    #[error("Failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML configuration.
    #[error("Failed to serialize TOML configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// Unsupported file format.
    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

/// Input accepted by [`Config::create_from`].
///
/// Either an already structured keyed bag or the JSON text of one. The
/// default is an empty bag, which produces a config with every field unset.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// A structured value, usually a JSON object.
    Value(Value),
    /// JSON-encoded text of the same shape.
    Text(String),
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::Value(Value::Object(Map::new()))
    }
}

impl From<Value> for ConfigSource {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Map<String, Value>> for ConfigSource {
    fn from(map: Map<String, Value>) -> Self {
        Self::Value(Value::Object(map))
    }
}

impl From<String> for ConfigSource {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ConfigSource {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Capture configuration.
///
/// # Example
///
/// ```rust
/// use req_capture::config::Config;
///
/// let config = Config::from_json(r#"{"URL":"http://x","Debug":true}"#).unwrap();
/// assert_eq!(config.url.as_deref(), Some("http://x"));
/// assert_eq!(config.debug, Some(true));
/// assert_eq!(config.browser_path, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Address the browser navigates to.
    #[serde(rename = "URL", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Debug-mode toggle.
    #[serde(rename = "Debug", default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,

    /// Path to the browser executable. If None, the system browser is used.
    #[serde(
        rename = "BrowserPath",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub browser_path: Option<String>,
}

impl Config {
    /// Creates a config with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a config from a structured or textual source.
    ///
    /// Text is decoded as JSON first and then handled like a structured value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if textual input is not valid JSON.
    pub fn create_from(source: impl Into<ConfigSource>) -> Result<Self, ConfigError> {
        match source.into() {
            ConfigSource::Value(value) => Ok(Self::from_value(&value)),
            ConfigSource::Text(text) => Self::from_json(&text),
        }
    }

    /// Builds a config from a keyed bag.
    ///
    /// Each field is copied by key. Missing keys, `null` values and values of
    /// the wrong type leave the field unset. Unknown keys are ignored.
    pub fn from_value(source: &Value) -> Self {
        let text = |key: &str| source.get(key).and_then(Value::as_str).map(str::to_owned);

        Self {
            url: text(URL_KEY),
            debug: source.get(DEBUG_KEY).and_then(Value::as_bool),
            browser_path: text(BROWSER_PATH_KEY),
        }
    }

    /// Builds a config from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if `text` is not valid JSON.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::from_value(&value))
    }

    /// Returns the keyed-bag form of this config. Unset fields are omitted.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(ref url) = self.url {
            map.insert(URL_KEY.to_string(), Value::String(url.clone()));
        }
        if let Some(debug) = self.debug {
            map.insert(DEBUG_KEY.to_string(), Value::Bool(debug));
        }
        if let Some(ref path) = self.browser_path {
            map.insert(BROWSER_PATH_KEY.to_string(), Value::String(path.clone()));
        }
        Value::Object(map)
    }

    /// Returns the JSON text form of this config.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Loads a config from a `.toml` or `.json` file.
    ///
    /// Both formats follow the same rules as [`Config::from_value`]: values
    /// of the wrong type leave their field unset.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use req_capture::config::Config;
    ///
    /// let config = Config::from_file("capture.toml").unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        match file_extension(path).as_str() {
            "toml" => {
                let table: toml::Value = toml::from_str(&content)?;
                Ok(Self::from_value(&serde_json::to_value(table)?))
            }
            "json" => Self::from_json(&content),
            ext => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    /// Saves the config to a `.toml` or `.json` file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();

        let content = match file_extension(path).as_str() {
            "toml" => toml::to_string_pretty(self)?,
            "json" => serde_json::to_string_pretty(self)?,
            ext => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Loads a config from `REQ_CAPTURE_*` environment variables only.
    pub fn from_env() -> Self {
        Self::default().merge_with_env()
    }

    /// Applies environment variable overrides:
    /// - `REQ_CAPTURE_URL`
    /// - `REQ_CAPTURE_DEBUG`
    /// - `REQ_CAPTURE_BROWSER_PATH`
    pub fn merge_with_env(self) -> Self {
        self.merge_with_lookup(|name| env::var(name).ok())
    }

    fn merge_with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| lookup(&format!("{}{}", ENV_PREFIX, suffix));

        if let Some(val) = var("URL") {
            self.url = Some(val);
        }

        if let Some(val) = var("DEBUG") {
            self.debug = Some(val.to_lowercase() == "true" || val == "1");
        }

        if let Some(val) = var("BROWSER_PATH") {
            self.browser_path = Some(val);
        }

        self
    }

    /// Applies CLI overrides. Only arguments that were given replace values.
    pub fn merge_with_args(mut self, args: &CliArgs) -> Self {
        if let Some(ref url) = args.url {
            self.url = Some(url.clone());
        }
        if let Some(debug) = args.debug {
            self.debug = Some(debug);
        }
        if let Some(ref path) = args.browser_path {
            self.browser_path = Some(path.clone());
        }
        self
    }

    /// Checks that a configured URL is an absolute http(s) address.
    ///
    /// `Debug` and `BrowserPath` are accepted as given.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref raw) = self.url {
            let parsed = Url::parse(raw).map_err(|e| {
                ConfigError::Validation(format!("URL '{}' is not valid: {}", raw, e))
            })?;

            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Validation(format!(
                    "URL scheme must be http or https, got '{}'",
                    parsed.scheme()
                )));
            }
        }
        Ok(())
    }

    /// URL to navigate to, falling back to [`DEFAULT_URL`].
    pub fn effective_url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_URL)
    }

    /// True only when `Debug` is explicitly set to `true`.
    pub fn is_debug(&self) -> bool {
        self.debug == Some(true)
    }

    /// Sets the target URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the debug flag.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Sets the browser executable path.
    pub fn with_browser_path(mut self, path: impl Into<String>) -> Self {
        self.browser_path = Some(path.into());
        self
    }
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Command line overrides. All fields are optional to allow partial overrides.
#[derive(Debug, Default, Clone)]
pub struct CliArgs {
    /// Target URL.
    pub url: Option<String>,
    /// Debug flag.
    pub debug: Option<bool>,
    /// Browser executable path.
    pub browser_path: Option<String>,
    /// Configuration file path.
    pub config_file: Option<PathBuf>,
}

impl CliArgs {
    /// Creates an empty CliArgs instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the final config by applying the full chain:
    /// 1. Configuration file (if specified), otherwise an empty config
    /// 2. Environment variables
    /// 3. CLI arguments (self)
    pub fn load_settings(&self) -> Result<Config, ConfigError> {
        let config = match self.config_file {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        let config = config.merge_with_env().merge_with_args(self);
        config.validate()?;

        Ok(config)
    }
}
