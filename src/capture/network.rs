//! Browser network events and the helpers that turn them into captures.
//!
//! The event shapes mirror what a DevTools-protocol driver reports: a request
//! about to be sent, and a response that was received for it.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use super::model::{Data, Header, RequestInfo};

/// Raw header map as reported by the browser. Values are usually strings.
pub type Headers = Map<String, Value>;

/// HTTP GET method name.
pub const METHOD_GET: &str = "GET";

/// HTTP POST method name.
pub const METHOD_POST: &str = "POST";

const JSON_MIME: &str = "application/json";

/// An outgoing request observed in the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkRequest {
    /// Full request URL, query included.
    pub url: String,

    /// HTTP method.
    pub method: String,

    /// Request headers.
    #[serde(default)]
    pub headers: Headers,

    /// Request body, if the browser exposed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<String>,
}

/// A response observed in the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkResponse {
    /// URL of the request this responds to.
    pub url: String,

    /// HTTP status code.
    pub status: i64,

    /// Response headers.
    #[serde(default)]
    pub headers: Headers,
}

/// Network activity reported by a browser session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum NetworkEvent {
    /// The page is about to send a request.
    RequestWillBeSent {
        /// Browser-side request id.
        request_id: String,
        /// The outgoing request.
        request: NetworkRequest,
    },
    /// A response arrived for an earlier request.
    ResponseReceived {
        /// Browser-side id of the answered request.
        request_id: String,
        /// The response.
        response: NetworkResponse,
    },
}

/// A browser cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Formats cookies the way a `Cookie` request header carries them.
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Checks whether the headers declare a JSON body.
///
/// The lowercase `content-type` key wins over `Content-Type` when both exist.
pub fn content_type_is_json(headers: &Headers) -> bool {
    let content_type = headers
        .get("content-type")
        .or_else(|| headers.get("Content-Type"));

    match content_type {
        Some(Value::String(value)) => value.contains(JSON_MIME),
        _ => false,
    }
}

fn header_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Extracts the headers worth keeping from a raw header map.
pub fn to_header(headers: &Headers) -> Header {
    let get = |key: &str| headers.get(key).map(header_string).unwrap_or_default();

    let content_type = headers
        .get("content-type")
        .or_else(|| headers.get("Content-Type"))
        .map(header_string)
        .unwrap_or_default();

    Header {
        content_type,
        authorization: get("Authorization"),
        cookies: String::new(),
        user_agent: get("User-Agent"),
    }
}

/// Builds a capture for a GET request.
///
/// Returns `None` for anything but http(s) URLs. The query string is split
/// off into `data.params`. The recorded URL is normalized: an explicit
/// default port is dropped and the path stays percent-encoded, so it can be
/// replayed as-is.
pub fn request_from_get(req: &NetworkRequest) -> Option<RequestInfo> {
    let parsed = Url::parse(&req.url).ok()?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let host = parsed.host_str().unwrap_or_default();
    let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();

    Some(RequestInfo {
        url: format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path()),
        method: METHOD_GET.to_string(),
        header: to_header(&req.headers),
        data: Data {
            params: parsed.query().unwrap_or_default().to_string(),
            payload: String::new(),
        },
        ..Default::default()
    })
}

/// Builds a capture for a POST request. The body is kept only if it is JSON.
pub fn request_from_post(req: &NetworkRequest) -> RequestInfo {
    let mut info = RequestInfo::new(req.url.clone(), METHOD_POST);
    info.header = to_header(&req.headers);

    if let Some(ref body) = req.post_data {
        if serde_json::from_str::<IgnoredAny>(body).is_ok() {
            info.data.payload = body.clone();
        }
    }

    info
}
