use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Deserialize a field that may be absent or `null` into its default value.
///
/// Browser exports are inconsistent about optional fields, so every field of
/// the model goes through this instead of failing the whole capture.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Integer field that tolerates floats (truncated) and non-numbers (zero)
fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        _ => 0,
    })
}

/// Float field that maps non-numbers to zero
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or_default())
}

/// Optional timing phase; anything but a number is absent
fn lenient_phase<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// Entries decoded one at a time; an entry that does not fit the model is
/// kept as [`Entry::default`] so it still counts
fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<Entry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            Entry::deserialize(value).unwrap_or_else(|e| {
                tracing::warn!("Entry {} does not fit the HAR model, kept empty: {}", idx, e);
                Entry::default()
            })
        })
        .collect())
}

/// Top-level HAR object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Har {
    #[serde(default, deserialize_with = "null_default")]
    pub log: Log,
}

/// Main HAR log object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Log {
    #[serde(default, deserialize_with = "null_default")]
    pub version: String,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub entries: Vec<Entry>,
}

/// Individual HTTP transaction entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    #[serde(
        rename = "startedDateTime",
        default,
        deserialize_with = "null_default"
    )]
    pub started_date_time: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub time: f64,
    #[serde(default, deserialize_with = "null_default")]
    pub request: Request,
    #[serde(default, deserialize_with = "null_default")]
    pub response: Response,
    #[serde(default, deserialize_with = "null_default")]
    pub timings: Timings,
    #[serde(rename = "_initiator", default, skip_serializing_if = "Option::is_none")]
    pub initiator: Option<Initiator>,
    #[serde(
        rename = "_webSocketMessages",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub websocket_messages: Option<Vec<WebSocketMessage>>,
}

/// HTTP request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Request {
    #[serde(default, deserialize_with = "null_default")]
    pub method: String,
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
    #[serde(rename = "httpVersion", default, deserialize_with = "null_default")]
    pub http_version: String,
    #[serde(default, deserialize_with = "null_default")]
    pub cookies: Vec<Cookie>,
    #[serde(default, deserialize_with = "null_default")]
    pub headers: Vec<Header>,
    #[serde(rename = "queryString", default, deserialize_with = "null_default")]
    pub query_string: Vec<QueryParam>,
    #[serde(rename = "postData", default, skip_serializing_if = "Option::is_none")]
    pub post_data: Option<PostData>,
    #[serde(rename = "bodySize", default, deserialize_with = "lenient_i64")]
    pub body_size: i64,
}

/// HTTP response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub status: i64,
    #[serde(rename = "statusText", default, deserialize_with = "null_default")]
    pub status_text: String,
    #[serde(rename = "httpVersion", default, deserialize_with = "null_default")]
    pub http_version: String,
    #[serde(default, deserialize_with = "null_default")]
    pub cookies: Vec<Cookie>,
    #[serde(default, deserialize_with = "null_default")]
    pub headers: Vec<Header>,
    #[serde(default, deserialize_with = "null_default")]
    pub content: Content,
    #[serde(rename = "redirectURL", default, deserialize_with = "null_default")]
    pub redirect_url: String,
    #[serde(rename = "bodySize", default, deserialize_with = "lenient_i64")]
    pub body_size: i64,
}

/// Cookie
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cookie {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(rename = "httpOnly", default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    #[serde(rename = "sameSite", default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

/// HTTP header
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Header {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub value: String,
}

/// Query parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryParam {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub value: String,
}

/// POST data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostData {
    #[serde(rename = "mimeType", default, deserialize_with = "null_default")]
    pub mime_type: String,
    #[serde(default, deserialize_with = "null_default")]
    pub params: Vec<Param>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// POST parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Param {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "fileName", default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Response content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub size: i64,
    #[serde(rename = "mimeType", default, deserialize_with = "null_default")]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

/// Timing information
///
/// HAR uses `-1` for phases that do not apply; [`Timings::phase`] folds those
/// into "absent".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timings {
    #[serde(
        default,
        deserialize_with = "lenient_phase",
        skip_serializing_if = "Option::is_none"
    )]
    pub blocked: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_phase",
        skip_serializing_if = "Option::is_none"
    )]
    pub dns: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_phase",
        skip_serializing_if = "Option::is_none"
    )]
    pub connect: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_phase",
        skip_serializing_if = "Option::is_none"
    )]
    pub ssl: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_phase",
        skip_serializing_if = "Option::is_none"
    )]
    pub send: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_phase",
        skip_serializing_if = "Option::is_none"
    )]
    pub wait: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_phase",
        skip_serializing_if = "Option::is_none"
    )]
    pub receive: Option<f64>,
}

/// One of the seven HAR timing phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Blocked,
    Dns,
    Connect,
    Ssl,
    Send,
    Wait,
    Receive,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Blocked,
        Phase::Dns,
        Phase::Connect,
        Phase::Ssl,
        Phase::Send,
        Phase::Wait,
        Phase::Receive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Blocked => "Blocked",
            Phase::Dns => "DNS",
            Phase::Connect => "Connect",
            Phase::Ssl => "SSL",
            Phase::Send => "Send",
            Phase::Wait => "Wait",
            Phase::Receive => "Receive",
        }
    }
}

impl Timings {
    /// Duration of a phase in ms; `0.0` when absent or negative
    pub fn phase(&self, phase: Phase) -> f64 {
        let value = match phase {
            Phase::Blocked => self.blocked,
            Phase::Dns => self.dns,
            Phase::Connect => self.connect,
            Phase::Ssl => self.ssl,
            Phase::Send => self.send,
            Phase::Wait => self.wait,
            Phase::Receive => self.receive,
        };
        value.filter(|v| *v > 0.0).unwrap_or(0.0)
    }
}

/// Chrome's `_initiator` extension
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Initiator {
    #[serde(rename = "type", default, deserialize_with = "null_default")]
    pub kind: String,
}

/// Chrome's `_webSocketMessages` extension
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type", default, deserialize_with = "null_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub time: f64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub opcode: i64,
    #[serde(default, deserialize_with = "null_default")]
    pub data: String,
}

fn find_header<'a>(headers: &'a [Header], name: &str) -> &'a str {
    headers
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.as_str())
        .unwrap_or("")
}

impl Entry {
    /// Request header value by case-insensitive name, `""` when absent
    pub fn request_header(&self, name: &str) -> &str {
        find_header(&self.request.headers, name)
    }

    /// Response header value by case-insensitive name, `""` when absent
    pub fn response_header(&self, name: &str) -> &str {
        find_header(&self.response.headers, name)
    }

    pub fn has_response_header(&self, name: &str) -> bool {
        self.response
            .headers
            .iter()
            .any(|h| h.name.eq_ignore_ascii_case(name))
    }

    /// All values of a response header, e.g. every `Set-Cookie` line
    pub fn response_header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.response
            .headers
            .iter()
            .filter(move |h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn parsed_url(&self) -> Option<Url> {
        Url::parse(&self.request.url).ok()
    }

    /// Network location (host plus explicit port), `"unknown"` when the URL
    /// does not parse
    pub fn host(&self) -> String {
        match self.parsed_url() {
            Some(url) => network_location(&url),
            None => "unknown".to_string(),
        }
    }

    pub fn scheme(&self) -> String {
        self.parsed_url()
            .map(|u| u.scheme().to_string())
            .unwrap_or_default()
    }

    pub fn path(&self) -> String {
        match self.parsed_url() {
            Some(url) => url.path().to_string(),
            None => self.request.url.clone(),
        }
    }

    /// Response MIME type without parameters, lower-cased
    pub fn base_mime(&self) -> String {
        base_mime(&self.response.content.mime_type)
    }

    /// Uncompressed response size, never negative
    pub fn response_size(&self) -> u64 {
        self.response.content.size.max(0) as u64
    }

    pub fn elapsed(&self) -> f64 {
        if self.time.is_finite() && self.time > 0.0 {
            self.time
        } else {
            0.0
        }
    }

    pub fn initiator_kind(&self) -> &str {
        self.initiator
            .as_ref()
            .map(|i| i.kind.as_str())
            .filter(|k| !k.is_empty())
            .unwrap_or("other")
    }
}

/// Host with its explicit port, mirroring a URL's netloc
pub fn network_location(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Strip parameters from a MIME type: `text/html; charset=utf-8` -> `text/html`
pub fn base_mime(raw: &str) -> String {
    if let Ok(parsed) = raw.trim().parse::<mime::Mime>() {
        return parsed.essence_str().to_lowercase();
    }
    let essence = raw.split(';').next().unwrap_or("").trim().to_lowercase();
    if essence.is_empty() {
        "unknown".to_string()
    } else {
        essence
    }
}
