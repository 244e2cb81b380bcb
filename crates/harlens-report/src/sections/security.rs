use super::omitted;
use crate::context::ReportContext;
use harlens_core::analysis::classify;
use harlens_core::format;
use harlens_detectors::JwtInspector;
use serde::Serialize;
use std::collections::HashMap;

const CORS_MISSING: &str = "Cross-origin response without CORS header";

/// One issue kind on one domain, however many entries showed it
#[derive(Debug, Clone, Serialize)]
pub struct SecurityFinding {
    pub domain: String,
    pub label: String,
    pub occurrences: usize,
    pub example_url: String,
}

#[derive(Default)]
struct FindingSet {
    findings: Vec<SecurityFinding>,
    index: HashMap<(String, String), usize>,
}

impl FindingSet {
    fn record(&mut self, domain: &str, label: String, url: &str) {
        let key = (domain.to_string(), label);
        match self.index.get(&key) {
            Some(&at) => self.findings[at].occurrences += 1,
            None => {
                self.index.insert(key.clone(), self.findings.len());
                self.findings.push(SecurityFinding {
                    domain: key.0,
                    label: key.1,
                    occurrences: 1,
                    example_url: url.to_string(),
                });
            }
        }
    }
}

/// Deduplicated findings in first-seen order, uncapped
pub fn collect_findings(ctx: &ReportContext) -> Vec<SecurityFinding> {
    let mut set = FindingSet::default();

    for entry in ctx.entries {
        let domain = entry.host();
        let url = &entry.request.url;
        for issue in classify::security_issues(entry) {
            set.record(&domain, issue.to_string(), url);
        }
        if classify::cors_issue(entry).is_some() {
            set.record(&domain, CORS_MISSING.to_string(), url);
        }
    }

    for cookie in ctx.stats.cookies.insecure.iter() {
        set.record(
            &cookie.domain,
            format!("Cookie `{}` set without Secure flag", cookie.name),
            "",
        );
    }

    for jwt in JwtInspector::scan(ctx.entries) {
        let label = match (&jwt.header, jwt.algorithm()) {
            (None, _) => "Bearer JWT (header not decodable)".to_string(),
            (Some(_), _) if jwt.is_unsigned() => "Bearer JWT with alg=none (unsigned)".to_string(),
            (Some(_), Some(alg)) => format!("Bearer JWT (alg: {})", alg),
            (Some(_), None) => "Bearer JWT (alg: unknown)".to_string(),
        };
        let url = ctx
            .entries
            .get(jwt.entry_index)
            .map(|e| e.request.url.as_str())
            .unwrap_or("");
        set.record(&jwt.domain, label, url);
    }

    tracing::debug!("Collected {} security findings", set.findings.len());
    set.findings
}

pub(super) fn build(ctx: &ReportContext) -> Vec<String> {
    let findings = collect_findings(ctx);
    if findings.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![
        format!("## Security Findings ({})", findings.len()),
        String::new(),
    ];

    let limit = ctx.config.max_security_findings;
    for finding in findings.iter().take(limit) {
        let mut line = format!("- **{}** on {}", finding.label, finding.domain);
        if finding.occurrences > 1 {
            line.push_str(&format!(" ({} requests)", finding.occurrences));
        }
        if !finding.example_url.is_empty() {
            line.push_str(&format!(" e.g. `{}`", format::truncate(&finding.example_url, 100)));
        }
        lines.push(line);
    }

    if let Some(note) = omitted(findings.len().saturating_sub(limit), "findings") {
        lines.push(note);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ReportMode;
    use crate::sections::Section;
    use harlens_core::ReportConfig;
    use harlens_core::analysis::EntryAggregator;
    use harlens_core::har::{Entry, Header, Request, Response};

    fn entry(url: &str) -> Entry {
        Entry {
            request: Request {
                method: "GET".to_string(),
                url: url.to_string(),
                ..Default::default()
            },
            response: Response {
                status: 200,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn with_context<T>(entries: &[Entry], config: ReportConfig, f: impl FnOnce(&ReportContext) -> T) -> T {
        let stats = EntryAggregator::new(config.clone()).aggregate(entries);
        let ctx = ReportContext {
            entries,
            stats: &stats,
            config: &config,
            mode: ReportMode::Forensic,
        };
        f(&ctx)
    }

    #[test]
    fn test_plain_http_reported_once_per_domain() {
        let entries = vec![
            entry("http://legacy.example.com/a"),
            entry("http://legacy.example.com/b"),
            entry("http://legacy.example.com/c"),
        ];
        let text = with_context(&entries, ReportConfig::forensic(), |ctx| {
            Section::Security.build(ctx)
        });
        assert_eq!(text.matches("HTTP (no TLS)").count(), 1);
        assert!(text.contains("- **HTTP (no TLS)** on legacy.example.com (3 requests)"));
    }

    #[test]
    fn test_jwt_findings() {
        let mut signed = entry("https://api.example.com/me");
        signed.request.headers.push(Header {
            name: "Authorization".to_string(),
            // {"alg":"HS256","typ":"JWT"}
            value: "Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJzdWIiOiIxIn0.sig".to_string(),
        });
        let mut garbled = entry("https://auth.example.com/me");
        garbled.request.headers.push(Header {
            name: "Authorization".to_string(),
            value: "Bearer !!!notbase64.payload.sig".to_string(),
        });

        let findings = with_context(&[signed, garbled], ReportConfig::forensic(), collect_findings);
        let labels: Vec<_> = findings.iter().map(|f| f.label.as_str()).collect();
        assert!(labels.contains(&"Bearer JWT (alg: HS256)"));
        assert!(labels.contains(&"Bearer JWT (header not decodable)"));
    }

    #[test]
    fn test_findings_capped_with_note() {
        let entries: Vec<_> = (0..4)
            .map(|i| entry(&format!("http://host{}.example.com/", i)))
            .collect();
        let config = ReportConfig {
            max_security_findings: 2,
            ..ReportConfig::forensic()
        };
        let text = with_context(&entries, config, |ctx| Section::Security.build(ctx));
        assert!(text.starts_with("## Security Findings (4)"));
        assert!(text.contains("_... and 2 more findings_"));
    }

    #[test]
    fn test_missing_headers_on_html() {
        let mut page = entry("https://www.example.com/");
        page.response.content.mime_type = "text/html".to_string();
        page.response.headers.push(Header {
            name: "Strict-Transport-Security".to_string(),
            value: "max-age=31536000".to_string(),
        });
        let findings = with_context(&[page], ReportConfig::summary(), collect_findings);
        let labels: Vec<_> = findings.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Missing X-Content-Type-Options", "Missing X-Frame-Options", "Missing CSP"]
        );
    }

    #[test]
    fn test_cors_finding_ignores_origin() {
        let entries: Vec<_> = ["https://one.com", "https://two.com", "https://three.com"]
            .iter()
            .map(|origin| {
                let mut e = entry("https://api.x.com/data");
                e.request.headers.push(Header {
                    name: "Origin".to_string(),
                    value: origin.to_string(),
                });
                e
            })
            .collect();

        let findings = with_context(&entries, ReportConfig::forensic(), collect_findings);
        let cors: Vec<_> = findings
            .iter()
            .filter(|f| f.label == "Cross-origin response without CORS header")
            .collect();
        assert_eq!(cors.len(), 1);
        assert_eq!(cors[0].domain, "api.x.com");
        assert_eq!(cors[0].occurrences, 3);
    }
}
