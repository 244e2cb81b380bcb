use crate::filter::HostPattern;
use serde::{Deserialize, Serialize};

/// Smallest report budget; leaves room for the truncation marker
pub const MIN_REPORT_CHARS: usize = 100;

/// How the domain table is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainOrder {
    ByTime,
    ByCount,
}

/// Every tunable of the analysis and report pipeline
///
/// Two presets exist, [`ReportConfig::summary`] and [`ReportConfig::forensic`];
/// they share the aggregation logic and differ only in caps and toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    pub slow_threshold_ms: f64,
    pub large_response_kb: u64,
    pub max_errors: usize,
    pub max_slow_requests: usize,
    pub max_large_responses: usize,
    /// Cap on every category list kept by the aggregator
    pub max_collected: usize,
    pub max_websocket_messages: usize,
    pub max_security_findings: usize,
    pub max_redirects: usize,
    pub max_domains: usize,
    pub domain_order: DomainOrder,
    pub max_api_endpoints: usize,
    pub max_detailed_entries: usize,
    pub max_body_chars: usize,
    pub max_report_chars: usize,
    pub include_bodies: bool,
    pub include_headers: bool,
    pub include_cookies: bool,
    /// Comma separated host names or globs rendered first in the detail dump
    pub priority_domains: String,
}

impl ReportConfig {
    /// Compact report returned by the `analyze` entry point
    pub fn summary() -> Self {
        Self {
            slow_threshold_ms: 1000.0,
            large_response_kb: 500,
            max_errors: 30,
            max_slow_requests: 20,
            max_large_responses: 15,
            max_collected: 500,
            max_websocket_messages: 20,
            max_security_findings: 20,
            max_redirects: 10,
            max_domains: 15,
            domain_order: DomainOrder::ByTime,
            max_api_endpoints: 35,
            max_detailed_entries: 0,
            max_body_chars: 2000,
            max_report_chars: 60_000,
            include_bodies: true,
            include_headers: true,
            include_cookies: true,
            priority_domains: String::new(),
        }
    }

    /// Full report injected into chat messages by the interceptor
    pub fn forensic() -> Self {
        Self {
            max_security_findings: 60,
            max_redirects: 25,
            max_domains: 25,
            domain_order: DomainOrder::ByCount,
            max_detailed_entries: 40,
            max_report_chars: 120_000,
            ..Self::summary()
        }
    }

    pub fn large_response_bytes(&self) -> u64 {
        self.large_response_kb.saturating_mul(1024)
    }

    /// Parse `priority_domains`; invalid patterns are skipped
    pub fn priority_patterns(&self) -> Vec<HostPattern> {
        self.priority_domains
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .filter_map(|p| match HostPattern::parse(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    tracing::warn!("Skipping priority domain pattern: {}", e);
                    None
                }
            })
            .collect()
    }

    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        macro_rules! apply {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = &overrides.$field {
                    self.$field = value.clone();
                })*
            };
        }
        apply!(
            slow_threshold_ms,
            large_response_kb,
            max_errors,
            max_slow_requests,
            max_large_responses,
            max_collected,
            max_websocket_messages,
            max_security_findings,
            max_redirects,
            max_domains,
            domain_order,
            max_api_endpoints,
            max_detailed_entries,
            max_body_chars,
            max_report_chars,
            include_bodies,
            include_headers,
            include_cookies,
            priority_domains,
        );

        if self.max_report_chars < MIN_REPORT_CHARS {
            tracing::warn!(
                "max_report_chars {} is below the minimum, using {}",
                self.max_report_chars,
                MIN_REPORT_CHARS
            );
            self.max_report_chars = MIN_REPORT_CHARS;
        }
    }

    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        self.apply(overrides);
        self
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::summary()
    }
}

/// Partial configuration layered on top of a preset
///
/// Deserialized from the config file and built from CLI flags; later layers
/// win via [`ConfigOverrides::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigOverrides {
    pub slow_threshold_ms: Option<f64>,
    pub large_response_kb: Option<u64>,
    pub max_errors: Option<usize>,
    pub max_slow_requests: Option<usize>,
    pub max_large_responses: Option<usize>,
    pub max_collected: Option<usize>,
    pub max_websocket_messages: Option<usize>,
    pub max_security_findings: Option<usize>,
    pub max_redirects: Option<usize>,
    pub max_domains: Option<usize>,
    pub domain_order: Option<DomainOrder>,
    pub max_api_endpoints: Option<usize>,
    pub max_detailed_entries: Option<usize>,
    pub max_body_chars: Option<usize>,
    pub max_report_chars: Option<usize>,
    pub include_bodies: Option<bool>,
    pub include_headers: Option<bool>,
    pub include_cookies: Option<bool>,
    pub priority_domains: Option<String>,
}

impl ConfigOverrides {
    /// Fields set in `other` replace the ones in `self`
    pub fn merge(mut self, other: ConfigOverrides) -> Self {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field;
                })*
            };
        }
        merge!(
            slow_threshold_ms,
            large_response_kb,
            max_errors,
            max_slow_requests,
            max_large_responses,
            max_collected,
            max_websocket_messages,
            max_security_findings,
            max_redirects,
            max_domains,
            domain_order,
            max_api_endpoints,
            max_detailed_entries,
            max_body_chars,
            max_report_chars,
            include_bodies,
            include_headers,
            include_cookies,
            priority_domains,
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_differ_only_in_caps() {
        let summary = ReportConfig::summary();
        let forensic = ReportConfig::forensic();
        assert_eq!(summary.max_security_findings, 20);
        assert_eq!(forensic.max_security_findings, 60);
        assert_eq!(summary.max_redirects, 10);
        assert_eq!(forensic.max_redirects, 25);
        assert_eq!(summary.slow_threshold_ms, forensic.slow_threshold_ms);
        assert_eq!(summary.max_detailed_entries, 0);
    }

    #[test]
    fn test_overrides_apply_only_set_fields() {
        let overrides: ConfigOverrides =
            serde_json::from_str(r#"{"slow_threshold_ms": 250, "include_bodies": false}"#).unwrap();
        let config = ReportConfig::forensic().with_overrides(&overrides);
        assert_eq!(config.slow_threshold_ms, 250.0);
        assert!(!config.include_bodies);
        assert_eq!(config.max_security_findings, 60);
    }

    #[test]
    fn test_report_budget_has_a_floor() {
        let overrides = ConfigOverrides {
            max_report_chars: Some(10),
            ..Default::default()
        };
        let config = ReportConfig::summary().with_overrides(&overrides);
        assert_eq!(config.max_report_chars, MIN_REPORT_CHARS);
    }

    #[test]
    fn test_merge_prefers_later_layer() {
        let file = ConfigOverrides {
            max_errors: Some(5),
            max_domains: Some(3),
            ..Default::default()
        };
        let flags = ConfigOverrides {
            max_errors: Some(9),
            ..Default::default()
        };
        let merged = file.merge(flags);
        assert_eq!(merged.max_errors, Some(9));
        assert_eq!(merged.max_domains, Some(3));
    }

    #[test]
    fn test_priority_patterns_skip_blanks() {
        let config = ReportConfig {
            priority_domains: "api.example.com, ,*.cdn.net".to_string(),
            ..ReportConfig::forensic()
        };
        let patterns = config.priority_patterns();
        assert_eq!(patterns.len(), 2);
        assert!(patterns[1].matches("img.cdn.net"));
    }
}
