//! Per-entry classification rules.
//!
//! Each function looks at a single entry and nothing else, so the aggregator
//! and the report sections can share them without agreeing on any state.

use crate::har::{Entry, Phase};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref WEBRTC_PATTERNS: Vec<Regex> = [
        r"stun:",
        r"turn:",
        r"\.twilio\.com",
        r"\.xirsys\.com",
        r"webrtc",
        r"rtc\.",
        r"\.peerjs\.",
        r"signaling",
        r"ice.*candidate",
        r"sdp",
        r"peer.*connection",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();
    static ref MAX_AGE: Regex = Regex::new(r"max-age=(\d+)").unwrap();
}

const STATIC_EXTENSIONS: &[&str] = &[
    ".js", ".css", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp", ".woff", ".woff2", ".ttf",
    ".otf", ".ico",
];

const STATIC_MIME_TYPES: &[&str] = &[
    "text/css",
    "application/javascript",
    "text/javascript",
    "image/png",
    "image/jpeg",
    "image/gif",
    "image/svg+xml",
    "image/webp",
    "image/x-icon",
    "font/woff",
    "font/woff2",
];

const COMPRESSIBLE_MIME_TYPES: &[&str] = &[
    "text/html",
    "text/css",
    "text/plain",
    "text/javascript",
    "application/javascript",
    "application/json",
    "application/xml",
    "image/svg+xml",
];

/// Responses smaller than this are not worth compressing
const COMPRESSION_MIN_BYTES: u64 = 1024;

/// One day; shorter `max-age` values on static assets are flagged
const MIN_STATIC_MAX_AGE: u64 = 86_400;

pub fn is_error(entry: &Entry) -> bool {
    entry.response.status >= 400
}

pub fn is_redirect(entry: &Entry) -> bool {
    (300..400).contains(&entry.response.status)
}

pub fn is_websocket(entry: &Entry) -> bool {
    let scheme = entry.scheme();
    scheme == "ws"
        || scheme == "wss"
        || entry.response_header("upgrade").eq_ignore_ascii_case("websocket")
        || entry.request_header("upgrade").eq_ignore_ascii_case("websocket")
}

pub fn is_webrtc(entry: &Entry) -> bool {
    let url_lower = entry.request.url.to_lowercase();
    WEBRTC_PATTERNS.iter().any(|p| p.is_match(&url_lower))
        || entry
            .response
            .content
            .mime_type
            .to_lowercase()
            .contains("application/sdp")
}

pub fn is_static_asset(entry: &Entry) -> bool {
    let path = entry.path().to_lowercase();
    STATIC_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        || STATIC_MIME_TYPES.contains(&entry.base_mime().as_str())
}

pub fn is_html(entry: &Entry) -> bool {
    entry
        .response_header("content-type")
        .to_lowercase()
        .contains("text/html")
        || entry.base_mime() == "text/html"
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CachingIssue {
    NoCachingHeaders,
    CachingDisabled,
    ShortMaxAge { seconds: u64 },
    NoValidationHeaders,
}

impl fmt::Display for CachingIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CachingIssue::NoCachingHeaders => write!(f, "No caching headers"),
            CachingIssue::CachingDisabled => write!(f, "Caching disabled"),
            CachingIssue::ShortMaxAge { seconds } => write!(f, "Short max-age ({}s)", seconds),
            CachingIssue::NoValidationHeaders => {
                write!(f, "No validation headers (ETag/Last-Modified)")
            }
        }
    }
}

/// Caching problems of a static asset; empty for everything else
///
/// Freshness problems are mutually exclusive (missing, disabled, short);
/// the missing validator flag can accompany any of them.
pub fn caching_issues(entry: &Entry) -> Vec<CachingIssue> {
    if !is_static_asset(entry) {
        return Vec::new();
    }

    let mut issues = Vec::new();
    let cache_control = entry.response_header("cache-control").to_lowercase();
    let has_expires = entry.has_response_header("expires");

    if cache_control.is_empty() && !has_expires {
        issues.push(CachingIssue::NoCachingHeaders);
    } else if cache_control.contains("no-cache") || cache_control.contains("no-store") {
        issues.push(CachingIssue::CachingDisabled);
    } else if let Some(seconds) = MAX_AGE
        .captures(&cache_control)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        && seconds < MIN_STATIC_MAX_AGE
    {
        issues.push(CachingIssue::ShortMaxAge { seconds });
    }

    if !entry.has_response_header("etag") && !entry.has_response_header("last-modified") {
        issues.push(CachingIssue::NoValidationHeaders);
    }

    issues
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SecurityHeader {
    Hsts,
    ContentTypeOptions,
    FrameOptions,
    Csp,
}

impl SecurityHeader {
    pub const ALL: [SecurityHeader; 4] = [
        SecurityHeader::Hsts,
        SecurityHeader::ContentTypeOptions,
        SecurityHeader::FrameOptions,
        SecurityHeader::Csp,
    ];

    pub fn header_name(&self) -> &'static str {
        match self {
            SecurityHeader::Hsts => "strict-transport-security",
            SecurityHeader::ContentTypeOptions => "x-content-type-options",
            SecurityHeader::FrameOptions => "x-frame-options",
            SecurityHeader::Csp => "content-security-policy",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SecurityHeader::Hsts => "HSTS",
            SecurityHeader::ContentTypeOptions => "X-Content-Type-Options",
            SecurityHeader::FrameOptions => "X-Frame-Options",
            SecurityHeader::Csp => "CSP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "header", rename_all = "snake_case")]
pub enum SecurityIssue {
    PlainHttp,
    MissingHeader(SecurityHeader),
    WildcardCors,
}

impl fmt::Display for SecurityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityIssue::PlainHttp => write!(f, "HTTP (no TLS)"),
            SecurityIssue::MissingHeader(header) => write!(f, "Missing {}", header.label()),
            SecurityIssue::WildcardCors => write!(f, "CORS allows all origins (*)"),
        }
    }
}

pub fn security_issues(entry: &Entry) -> Vec<SecurityIssue> {
    let mut issues = Vec::new();

    if entry.scheme() == "http" {
        issues.push(SecurityIssue::PlainHttp);
    }

    if is_html(entry) {
        issues.extend(
            SecurityHeader::ALL
                .iter()
                .filter(|h| !entry.has_response_header(h.header_name()))
                .map(|h| SecurityIssue::MissingHeader(*h)),
        );
    }

    if entry.response_header("access-control-allow-origin").trim() == "*" {
        issues.push(SecurityIssue::WildcardCors);
    }

    issues
}

/// Cross-origin request answered 2xx without an `Access-Control-Allow-Origin`
pub fn cors_issue(entry: &Entry) -> Option<String> {
    let origin = entry.request_header("origin");
    let status = entry.response.status;
    if !origin.is_empty()
        && (200..300).contains(&status)
        && !entry.has_response_header("access-control-allow-origin")
    {
        Some(origin.to_string())
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Compression {
    /// `Content-Encoding` present; savings only when both sizes are known
    /// and consistent
    Compressed { savings: u64 },
    /// Compressible text over 1KB sent without encoding
    ShouldCompress,
    NotApplicable,
}

pub fn compression(entry: &Entry) -> Compression {
    let encoding = entry.response_header("content-encoding").trim().to_lowercase();
    if !encoding.is_empty() && encoding != "identity" {
        let original = entry.response.content.size;
        let transferred = entry.response.body_size;
        let savings = if original > transferred && transferred > 0 {
            (original - transferred) as u64
        } else {
            0
        };
        return Compression::Compressed { savings };
    }

    if entry.response_size() > COMPRESSION_MIN_BYTES
        && COMPRESSIBLE_MIME_TYPES.contains(&entry.base_mime().as_str())
    {
        Compression::ShouldCompress
    } else {
        Compression::NotApplicable
    }
}

/// Dominant phase of a slow request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ms", rename_all = "snake_case")]
pub enum Bottleneck {
    ServerProcessing(f64),
    DnsLookup(f64),
    SslHandshake(f64),
    DownloadTime(f64),
}

impl fmt::Display for Bottleneck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bottleneck::ServerProcessing(ms) => {
                write!(f, "Server processing (wait={}ms)", crate::format::round2(*ms))
            }
            Bottleneck::DnsLookup(ms) => write!(f, "DNS lookup ({}ms)", crate::format::round2(*ms)),
            Bottleneck::SslHandshake(ms) => {
                write!(f, "SSL handshake ({}ms)", crate::format::round2(*ms))
            }
            Bottleneck::DownloadTime(ms) => {
                write!(f, "Download time ({}ms)", crate::format::round2(*ms))
            }
        }
    }
}

/// First matching rule wins: wait > 50% of total, DNS > 100ms,
/// TLS > 200ms, receive > 40% of total
pub fn bottleneck(entry: &Entry) -> Option<Bottleneck> {
    let total = entry.elapsed();
    let timings = &entry.timings;
    let wait = timings.phase(Phase::Wait);
    let dns = timings.phase(Phase::Dns);
    let ssl = timings.phase(Phase::Ssl);
    let receive = timings.phase(Phase::Receive);

    if wait > total * 0.5 {
        Some(Bottleneck::ServerProcessing(wait))
    } else if dns > 100.0 {
        Some(Bottleneck::DnsLookup(dns))
    } else if ssl > 200.0 {
        Some(Bottleneck::SslHandshake(ssl))
    } else if receive > total * 0.4 {
        Some(Bottleneck::DownloadTime(receive))
    } else {
        None
    }
}
