use super::{cell, omitted};
use crate::context::ReportContext;
use harlens_core::analysis::DomainStats;
use harlens_core::config::DomainOrder;
use harlens_core::format;
use std::cmp::Ordering;

pub(super) fn build(ctx: &ReportContext) -> Vec<String> {
    let mut domains: Vec<&DomainStats> = ctx.stats.domains.values().collect();
    if domains.is_empty() {
        return Vec::new();
    }

    domains.sort_by(|a, b| {
        let primary = match ctx.config.domain_order {
            DomainOrder::ByTime => b
                .total_time_ms
                .partial_cmp(&a.total_time_ms)
                .unwrap_or(Ordering::Equal),
            DomainOrder::ByCount => b.count.cmp(&a.count),
        };
        primary.then_with(|| a.domain.cmp(&b.domain))
    });

    let mut lines = vec![
        format!("## Domains ({})", domains.len()),
        String::new(),
        "| Domain | Requests | Time | Size | Errors | Type |".to_string(),
        "|--------|----------|------|------|--------|------|".to_string(),
    ];

    let limit = ctx.config.max_domains;
    for stats in domains.iter().take(limit) {
        lines.push(format!(
            "| {} | {} | {:.0}ms | {} | {} | {} |",
            cell(&stats.domain),
            stats.count,
            stats.total_time_ms,
            format::format_size(stats.total_size),
            stats.errors,
            party_label(stats)
        ));
    }

    if let Some(note) = omitted(domains.len().saturating_sub(limit), "domains") {
        lines.push(String::new());
        lines.push(note);
    }

    lines
}

fn party_label(stats: &DomainStats) -> String {
    match (stats.is_third_party, stats.same_site, stats.category) {
        (false, _, _) => "1st Party".to_string(),
        (true, true, _) => "3rd Party (same site)".to_string(),
        (true, false, Some(category)) => format!("3rd Party ({})", category.as_str()),
        (true, false, None) => "3rd Party".to_string(),
    }
}
