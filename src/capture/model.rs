//! Captured request records.
//!
//! A [`RequestInfo`] is what the frontend receives for every JSON API call
//! the page makes. Empty header and data fields are left out of the
//! serialized form.

use serde::{Deserialize, Serialize};

/// Request headers kept for replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Request content type.
    #[serde(rename = "Content-Type", default, skip_serializing_if = "String::is_empty")]
    pub content_type: String,

    /// Authorization header, e.g. a bearer token.
    #[serde(rename = "Authorization", default, skip_serializing_if = "String::is_empty")]
    pub authorization: String,

    /// Cookies as `name=value` pairs joined by `"; "`.
    #[serde(rename = "Cookie", default, skip_serializing_if = "String::is_empty")]
    pub cookies: String,

    /// Browser user agent.
    #[serde(rename = "User-Agent", default, skip_serializing_if = "String::is_empty")]
    pub user_agent: String,
}

impl Header {
    /// True when no header was recorded.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Query string of a GET or JSON body of a POST.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    /// Raw query string of a GET request, without the leading `?`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub params: String,

    /// JSON body of a POST request.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payload: String,
}

impl Data {
    /// True when neither params nor payload were recorded.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.payload.is_empty()
    }
}

/// Expected response properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// HTTP status of the JSON response. Zero until a response arrives.
    pub status_code: i64,
}

/// One captured API request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
    /// Request URL. For GET requests the query is moved to `data.params`.
    pub url: String,

    /// HTTP method.
    pub method: String,

    /// Headers kept for replay.
    #[serde(default, skip_serializing_if = "Header::is_empty")]
    pub header: Header,

    /// Query parameters or body.
    #[serde(default, skip_serializing_if = "Data::is_empty")]
    pub data: Data,

    /// Expected response properties.
    #[serde(default)]
    pub validator: Validator,

    /// Browser-side id used to fetch the response body.
    #[serde(skip)]
    pub request_id: String,

    /// Response body bytes, filled in when the session stops.
    #[serde(skip)]
    pub response_body: Vec<u8>,
}

impl RequestInfo {
    /// Creates a record for `method` on `url` with nothing else filled in.
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            ..Default::default()
        }
    }

    /// True once a JSON response has been matched to this request.
    pub fn is_answered(&self) -> bool {
        self.validator.status_code != 0
    }

    /// Response body as UTF-8 text, if it is valid UTF-8.
    pub fn response_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.response_body).ok()
    }
}

/// Export wrapper placing a request under the `api` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDocument {
    /// The exported request.
    pub api: RequestInfo,
}

impl CaptureDocument {
    pub fn new(api: RequestInfo) -> Self {
        Self { api }
    }

    /// Pretty TOML form.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Pretty JSON form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<RequestInfo> for CaptureDocument {
    fn from(api: RequestInfo) -> Self {
        Self::new(api)
    }
}
