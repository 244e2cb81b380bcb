use super::{cell, omitted, percent};
use crate::context::ReportContext;
use harlens_core::analysis::{LargeRecord, SlowRecord};
use harlens_core::format;
use harlens_core::har::Phase;
use std::cmp::Ordering;

pub(super) fn build(ctx: &ReportContext) -> Vec<String> {
    let mut lines = vec!["## Performance".to_string()];
    slow_requests(ctx, &mut lines);
    large_responses(ctx, &mut lines);
    timing_breakdown(ctx, &mut lines);
    lines
}

fn slow_requests(ctx: &ReportContext, lines: &mut Vec<String>) {
    let slow = &ctx.stats.slow_requests;
    lines.push(String::new());
    lines.push(format!(
        "### Slow Requests (>{}ms): {}",
        format::trim_float(ctx.config.slow_threshold_ms),
        slow.total()
    ));

    if slow.is_empty() {
        lines.push("None".to_string());
        return;
    }

    let mut sorted: Vec<&SlowRecord> = slow.iter().collect();
    sorted.sort_by(|a, b| {
        b.time_ms
            .partial_cmp(&a.time_ms)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.index.cmp(&b.index))
    });

    let shown = sorted.len().min(ctx.config.max_slow_requests);
    for (rank, record) in sorted.iter().take(shown).enumerate() {
        lines.push(format!(
            "{}. **{}** `{}`",
            rank + 1,
            record.method,
            format::truncate(&record.url, 120)
        ));
        lines.push(format!(
            "   - Total: {}ms | TTFB: {}ms | Size: {} | Status: {}",
            format::trim_float(record.time_ms),
            format::trim_float(record.wait_ms),
            format::format_size(record.size),
            record.status
        ));
        if let Some(bottleneck) = &record.bottleneck {
            lines.push(format!("   - Bottleneck: {}", bottleneck));
        }
    }

    if let Some(note) = omitted(slow.total().saturating_sub(shown), "slow requests") {
        lines.push(note);
    }
}

fn large_responses(ctx: &ReportContext, lines: &mut Vec<String>) {
    let large = &ctx.stats.large_responses;
    if large.is_empty() {
        return;
    }

    let mut sorted: Vec<&LargeRecord> = large.iter().collect();
    sorted.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.index.cmp(&b.index)));

    lines.push(String::new());
    lines.push(format!(
        "### Large Responses (>{}KB): {}",
        ctx.config.large_response_kb,
        large.total()
    ));
    lines.push("| Size | Type | Compressed | URL |".to_string());
    lines.push("|------|------|------------|-----|".to_string());

    let shown = sorted.len().min(ctx.config.max_large_responses);
    for record in sorted.iter().take(shown) {
        lines.push(format!(
            "| {} | {} | {} | {} |",
            format::format_size(record.size),
            cell(&record.mime),
            if record.compressed { "yes" } else { "no" },
            cell(&format::truncate(&record.url, 100))
        ));
    }

    if let Some(note) = omitted(large.total().saturating_sub(shown), "large responses") {
        lines.push(note);
    }
}

fn timing_breakdown(ctx: &ReportContext, lines: &mut Vec<String>) {
    let timings = &ctx.stats.timings;
    let total = timings.sum();
    if total <= 0.0 {
        return;
    }

    lines.push(String::new());
    lines.push("### Timing Breakdown".to_string());
    for phase in Phase::ALL {
        let ms = timings.get(phase);
        lines.push(format!(
            "- **{}:** {:.0}ms ({:.1}%)",
            phase.as_str(),
            ms,
            percent(ms, total)
        ));
    }
}
