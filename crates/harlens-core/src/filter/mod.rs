mod host_matcher;

pub use host_matcher::HostPattern;

/// True when any pattern matches the host
pub fn matches_any(patterns: &[HostPattern], host: &str) -> bool {
    patterns.iter().any(|pattern| pattern.matches(host))
}
