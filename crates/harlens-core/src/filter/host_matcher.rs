use glob::Pattern;

/// A host pattern from the priority domain list
#[derive(Debug, Clone)]
pub enum HostPattern {
    /// Domain match (case-insensitive), subdomains included
    Domain(String),
    /// Glob pattern match (e.g., *.example.com)
    Glob(Pattern),
}

impl HostPattern {
    /// Parse a host pattern string into a HostPattern
    ///
    /// If the pattern contains '*' or '?', it's treated as a glob pattern.
    /// Otherwise it matches the domain itself and any of its subdomains.
    pub fn parse(pattern: &str) -> crate::Result<Self> {
        let pattern_lower = pattern.trim().to_lowercase();
        if pattern_lower.is_empty() {
            return Err(crate::Error::InvalidPattern(
                "Empty host pattern".to_string(),
            ));
        }

        if pattern_lower.contains('*') || pattern_lower.contains('?') {
            let glob_pattern = Pattern::new(&pattern_lower).map_err(|e| {
                crate::Error::InvalidPattern(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
            Ok(HostPattern::Glob(glob_pattern))
        } else {
            Ok(HostPattern::Domain(
                pattern_lower.trim_start_matches('.').to_string(),
            ))
        }
    }

    /// Check if a host (optionally carrying a `:port`) matches this pattern
    pub fn matches(&self, host: &str) -> bool {
        let host_lower = host.to_lowercase();
        let hostname = strip_port(&host_lower);
        match self {
            HostPattern::Domain(domain) => {
                hostname == domain || hostname.ends_with(&format!(".{}", domain))
            }
            HostPattern::Glob(pattern) => pattern.matches(hostname),
        }
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 literal: [::1]:8080
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_match_includes_subdomains() {
        let pattern = HostPattern::parse("example.com").unwrap();
        assert!(pattern.matches("example.com"));
        assert!(pattern.matches("api.example.com"));
        assert!(pattern.matches("API.EXAMPLE.COM"));
        assert!(!pattern.matches("badexample.com"));
        assert!(!pattern.matches("example.com.evil.net"));
    }

    #[test]
    fn test_port_is_ignored() {
        let pattern = HostPattern::parse("localhost").unwrap();
        assert!(pattern.matches("localhost:3000"));

        let glob = HostPattern::parse("*.internal").unwrap();
        assert!(glob.matches("svc.internal:8443"));
    }

    #[test]
    fn test_glob_wildcard_prefix() {
        let pattern = HostPattern::parse("*.example.com").unwrap();
        assert!(pattern.matches("api.example.com"));
        assert!(pattern.matches("api-v2.example.com"));
        assert!(!pattern.matches("example.com"));
        assert!(!pattern.matches("api.different.com"));
    }

    #[test]
    fn test_glob_question_mark() {
        let pattern = HostPattern::parse("api?.example.com").unwrap();
        assert!(pattern.matches("api1.example.com"));
        assert!(!pattern.matches("api.example.com"));
        assert!(!pattern.matches("api12.example.com"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(HostPattern::parse("   ").is_err());
        assert!(HostPattern::parse("[*.example.com").is_err());
    }
}
