//! Small pure helpers shared by the aggregator and the report sections.

use serde::{Deserialize, Serialize};

/// Format a byte count the way the report prints sizes: `512B`, `1.5KB`, `2.25MB`
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{}KB", trim_float(round_to(bytes as f64 / 1024.0, 1)))
    } else {
        format!(
            "{}MB",
            trim_float(round_to(bytes as f64 / (1024.0 * 1024.0), 2))
        )
    }
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Print a float without a trailing `.0`
pub fn trim_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Marker shown next to a status code in histograms
pub fn status_marker(code: i64) -> &'static str {
    if code < 300 {
        "✅"
    } else if code < 400 {
        "↪️"
    } else if code < 500 {
        "⚠️"
    } else {
        "❌"
    }
}

/// Truncate to at most `max_chars` characters, marking the cut with `...`
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Keep only the first `max_chars` characters, no marker
pub fn clip(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ThirdPartyCategory {
    Analytics,
    Advertising,
    Cdn,
    Fonts,
    Social,
    Video,
    ChatSupport,
    Other,
}

impl ThirdPartyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThirdPartyCategory::Analytics => "Analytics",
            ThirdPartyCategory::Advertising => "Advertising",
            ThirdPartyCategory::Cdn => "CDN",
            ThirdPartyCategory::Fonts => "Fonts",
            ThirdPartyCategory::Social => "Social",
            ThirdPartyCategory::Video => "Video",
            ThirdPartyCategory::ChatSupport => "Chat/Support",
            ThirdPartyCategory::Other => "Other",
        }
    }
}

const CATEGORY_KEYWORDS: &[(ThirdPartyCategory, &[&str])] = &[
    (
        ThirdPartyCategory::Analytics,
        &["google-analytics", "analytics", "mixpanel", "segment", "hotjar", "heap"],
    ),
    (
        ThirdPartyCategory::Advertising,
        &["doubleclick", "googlesyndication", "adsense", "adnxs", "criteo"],
    ),
    (
        ThirdPartyCategory::Cdn,
        &["cloudflare", "cdn", "akamai", "fastly", "cloudfront", "jsdelivr", "unpkg"],
    ),
    (
        ThirdPartyCategory::Fonts,
        &["fonts.googleapis", "fonts.gstatic", "typekit", "fontawesome"],
    ),
    (
        ThirdPartyCategory::Social,
        &["facebook", "twitter", "linkedin", "instagram"],
    ),
    (
        ThirdPartyCategory::Video,
        &["youtube", "vimeo", "twitch", "wistia"],
    ),
    (
        ThirdPartyCategory::ChatSupport,
        &["intercom", "zendesk", "drift", "crisp", "tawk"],
    ),
];

/// Categorize a domain by keyword groups; first matching group wins
pub fn categorize_third_party(domain: &str) -> ThirdPartyCategory {
    let domain_lower = domain.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| domain_lower.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(ThirdPartyCategory::Other)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebRtcKind {
    Stun,
    Turn,
    Signaling,
    Sdp,
    Ice,
    Generic,
}

impl WebRtcKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebRtcKind::Stun => "STUN",
            WebRtcKind::Turn => "TURN",
            WebRtcKind::Signaling => "Signaling",
            WebRtcKind::Sdp => "SDP",
            WebRtcKind::Ice => "ICE",
            WebRtcKind::Generic => "WebRTC",
        }
    }
}

/// Label a WebRTC-related request; STUN > TURN > Signaling > SDP > ICE
pub fn webrtc_kind(url: &str, mime_type: &str) -> WebRtcKind {
    let url_lower = url.to_lowercase();
    if url_lower.contains("stun:") || url_lower.contains("stun.") {
        WebRtcKind::Stun
    } else if url_lower.contains("turn:") || url_lower.contains("turn.") {
        WebRtcKind::Turn
    } else if url_lower.contains("signal") {
        WebRtcKind::Signaling
    } else if url_lower.contains("sdp") || mime_type.to_lowercase().contains("application/sdp") {
        WebRtcKind::Sdp
    } else if url_lower.contains("ice") {
        WebRtcKind::Ice
    } else {
        WebRtcKind::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0B");
        assert_eq!(format_size(1023), "1023B");
        assert_eq!(format_size(1024), "1KB");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(800), "800B");
        assert_eq!(format_size(2_359_296), "2.25MB");
    }

    #[test]
    fn test_status_marker() {
        assert_eq!(status_marker(204), "✅");
        assert_eq!(status_marker(301), "↪️");
        assert_eq!(status_marker(404), "⚠️");
        assert_eq!(status_marker(503), "❌");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
        assert_eq!(clip("ééé", 2), "éé");
    }

    #[test]
    fn test_categorize_third_party_first_group_wins() {
        assert_eq!(
            categorize_third_party("www.google-analytics.com"),
            ThirdPartyCategory::Analytics
        );
        assert_eq!(
            categorize_third_party("stats.g.doubleclick.net"),
            ThirdPartyCategory::Advertising
        );
        assert_eq!(
            categorize_third_party("cdn.jsdelivr.net"),
            ThirdPartyCategory::Cdn
        );
        // "fonts.gstatic.com" has no earlier keyword
        assert_eq!(
            categorize_third_party("fonts.gstatic.com"),
            ThirdPartyCategory::Fonts
        );
        assert_eq!(
            categorize_third_party("widget.intercom.io"),
            ThirdPartyCategory::ChatSupport
        );
        assert_eq!(
            categorize_third_party("api.example.org"),
            ThirdPartyCategory::Other
        );
    }

    #[test]
    fn test_webrtc_kind_priority() {
        assert_eq!(webrtc_kind("stun:stun.l.google.com:19302", ""), WebRtcKind::Stun);
        assert_eq!(webrtc_kind("https://turn.example.com/creds", ""), WebRtcKind::Turn);
        assert_eq!(webrtc_kind("wss://rtc.example.com/signaling", ""), WebRtcKind::Signaling);
        assert_eq!(webrtc_kind("https://x.com/offer", "application/sdp"), WebRtcKind::Sdp);
        assert_eq!(webrtc_kind("https://x.com/ice-servers", ""), WebRtcKind::Ice);
        assert_eq!(webrtc_kind("https://x.com/webrtc", ""), WebRtcKind::Generic);
    }
}
