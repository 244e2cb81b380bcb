use crate::format::ThirdPartyCategory;
use crate::har::Entry;
use serde::Serialize;

/// Aggregate traffic for one network location
#[derive(Debug, Clone, Serialize)]
pub struct DomainStats {
    pub domain: String,
    pub count: usize,
    pub total_time_ms: f64,
    pub total_size: u64,
    pub errors: usize,
    pub is_third_party: bool,
    /// Third party, but under the same registrable domain as the first party
    pub same_site: bool,
    pub category: Option<ThirdPartyCategory>,
}

/// Network location of the first entry; `""` when it has no parsable URL
pub fn first_party_domain(entries: &[Entry]) -> String {
    entries
        .first()
        .and_then(|e| e.parsed_url())
        .map(|url| crate::har::network_location(&url))
        .unwrap_or_default()
}

/// Registrable domain via the Public Suffix List, port stripped
pub fn root_domain(host: &str) -> String {
    let hostname = match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        _ => host,
    };

    if hostname.parse::<std::net::IpAddr>().is_ok() {
        return hostname.to_string();
    }

    match psl::domain(hostname.as_bytes()) {
        Some(root) => String::from_utf8_lossy(root.as_bytes()).to_string(),
        None => {
            let parts: Vec<&str> = hostname.split('.').collect();
            if parts.len() >= 2 {
                format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1])
            } else {
                hostname.to_string()
            }
        }
    }
}

/// Normalize HTTP version strings to a consistent format
pub fn normalize_http_version(version: &str) -> String {
    let lower = version.trim().to_lowercase();
    match lower.as_str() {
        "" => "unknown".to_string(),
        "h2" | "http/2" | "http/2.0" => "HTTP/2.0".to_string(),
        "h3" | "http/3" | "http/3.0" => "HTTP/3.0".to_string(),
        "http/1.0" => "HTTP/1.0".to_string(),
        "http/1.1" => "HTTP/1.1".to_string(),
        _ => version.trim().to_string(),
    }
}
