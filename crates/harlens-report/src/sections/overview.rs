use super::percent;
use crate::context::{ReportContext, ReportMode};
use harlens_core::format::{self, ThirdPartyCategory};
use std::collections::BTreeMap;

const MAX_CONTENT_TYPES: usize = 10;
const MAX_DOMAINS_PER_CATEGORY: usize = 10;

pub(super) fn build(ctx: &ReportContext) -> Vec<String> {
    let stats = ctx.stats;
    let total = stats.total_requests as f64;
    let mut lines = Vec::new();

    lines.push(match ctx.mode {
        ReportMode::Summary => "# HAR Analysis Report".to_string(),
        ReportMode::Forensic => "# HAR Forensic Report".to_string(),
    });
    lines.push(String::new());
    lines.push("## Summary".to_string());
    lines.push(format!("- **Total Requests:** {}", stats.total_requests));
    lines.push(format!(
        "- **Total Load Time:** {:.2}s",
        stats.total_time_ms / 1000.0
    ));
    lines.push(format!(
        "- **Total Data Transferred:** {}",
        format::format_size(stats.total_size)
    ));
    if let Some(range) = &stats.time_range {
        let duration = range
            .duration_ms
            .map(|ms| format!(" ({:.1}s)", ms as f64 / 1000.0))
            .unwrap_or_default();
        lines.push(format!(
            "- **Capture Window:** {} to {}{}",
            range.start, range.end, duration
        ));
    }
    lines.push(format!(
        "- **First-Party Domain:** {}",
        stats.first_party_domain
    ));
    lines.push(format!(
        "- **Third-Party Domains:** {}",
        stats.third_party.len()
    ));
    lines.push(format!("- **Errors (4xx/5xx):** {}", stats.errors.total()));
    lines.push(format!(
        "- **Slow Requests (>{}ms):** {}",
        format::trim_float(ctx.config.slow_threshold_ms),
        stats.slow_requests.total()
    ));
    lines.push(format!(
        "- **WebSocket Connections:** {}",
        stats.websockets.total()
    ));
    lines.push(format!("- **WebRTC Requests:** {}", stats.webrtc.total()));
    lines.push(String::new());

    lines.push("## Status Code Distribution".to_string());
    for (code, count) in &stats.status_codes {
        lines.push(format!(
            "- {} **{}:** {} ({:.1}%)",
            format::status_marker(*code),
            code,
            count,
            percent(*count as f64, total)
        ));
    }
    lines.push(String::new());

    lines.push("## HTTP Methods".to_string());
    for (method, count) in by_count(&stats.methods) {
        let method = if method.is_empty() { "unknown" } else { method.as_str() };
        lines.push(format!("- **{}:** {}", method, count));
    }
    lines.push(String::new());

    lines.push("## Content Types".to_string());
    for (mime, count) in by_count(&stats.content_types)
        .into_iter()
        .take(MAX_CONTENT_TYPES)
    {
        lines.push(format!("- **{}:** {}", mime, count));
    }
    lines.push(String::new());

    lines.push("## HTTP Protocols".to_string());
    for (protocol, count) in by_count(&stats.protocols) {
        lines.push(format!("- **{}:** {}", protocol, count));
    }
    lines.push(String::new());

    lines.push("## Initiators".to_string());
    for (initiator, count) in by_count(&stats.initiators) {
        lines.push(format!("- **{}:** {}", initiator, count));
    }

    if !stats.third_party.is_empty() {
        lines.push(String::new());
        lines.push("## Third-Party Services".to_string());

        let mut by_category: BTreeMap<ThirdPartyCategory, Vec<&str>> = BTreeMap::new();
        for service in &stats.third_party {
            by_category
                .entry(service.category)
                .or_default()
                .push(&service.domain);
        }

        let mut categories: Vec<_> = by_category.into_iter().collect();
        categories.sort_by_key(|(category, _)| category.as_str());
        for (category, domains) in categories {
            lines.push(String::new());
            lines.push(format!("### {}", category.as_str()));
            for domain in domains.iter().take(MAX_DOMAINS_PER_CATEGORY) {
                lines.push(format!("- {}", domain));
            }
            if let Some(note) = super::omitted(
                domains.len().saturating_sub(MAX_DOMAINS_PER_CATEGORY),
                "domains",
            ) {
                lines.push(note);
            }
        }
    }

    lines
}

/// Histogram entries by descending count, ties by key
fn by_count<K: Ord>(histogram: &BTreeMap<K, usize>) -> Vec<(&K, usize)> {
    let mut items: Vec<_> = histogram.iter().map(|(k, v)| (k, *v)).collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    items
}
