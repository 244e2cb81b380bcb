use super::{cell, omitted};
use crate::context::ReportContext;
use harlens_core::format;

pub(super) fn build(ctx: &ReportContext) -> Vec<String> {
    let errors = &ctx.stats.errors;
    if errors.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![
        format!("## Errors ({})", errors.total()),
        String::new(),
        "| Status | Method | Type | Time | URL |".to_string(),
        "|--------|--------|------|------|-----|".to_string(),
    ];

    let shown = errors.len().min(ctx.config.max_errors);
    for error in errors.iter().take(shown) {
        let status = if error.status_text.is_empty() {
            format!("{} {}", format::status_marker(error.status), error.status)
        } else {
            format!(
                "{} {} {}",
                format::status_marker(error.status),
                error.status,
                cell(&error.status_text)
            )
        };
        lines.push(format!(
            "| {} | {} | {} | {}ms | {} |",
            status,
            error.method,
            cell(&error.mime),
            format::trim_float(error.time_ms),
            cell(&format::truncate(&error.url, 100))
        ));
    }

    if let Some(note) = omitted(errors.total().saturating_sub(shown), "errors") {
        lines.push(note);
    }

    lines
}

#[cfg(test)]
mod tests {
    use crate::context::{ReportContext, ReportMode};
    use crate::sections::Section;
    use harlens_core::ReportConfig;
    use harlens_core::analysis::EntryAggregator;
    use harlens_core::har::{Entry, Request, Response};

    fn not_found(count: usize) -> Vec<Entry> {
        (0..count)
            .map(|i| Entry {
                time: 7.5,
                request: Request {
                    method: "GET".to_string(),
                    url: format!("https://example.com/missing/{}", i),
                    ..Default::default()
                },
                response: Response {
                    status: 404,
                    status_text: "Not Found".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .collect()
    }

    fn render(entries: &[Entry], config: ReportConfig) -> String {
        let stats = EntryAggregator::new(config.clone()).aggregate(entries);
        let ctx = ReportContext {
            entries,
            stats: &stats,
            config: &config,
            mode: ReportMode::Summary,
        };
        Section::Errors.build(&ctx)
    }

    #[test]
    fn test_error_rows_and_cap() {
        let config = ReportConfig {
            max_errors: 3,
            ..ReportConfig::summary()
        };
        let text = render(&not_found(4), config);
        assert!(text.starts_with("## Errors (4)"));
        assert!(text.contains(
            "| ⚠️ 404 Not Found | GET | unknown | 7.5ms | https://example.com/missing/0 |"
        ));
        assert!(!text.contains("/missing/3"));
        assert!(text.contains("_... and 1 more errors_"));
    }

    #[test]
    fn test_note_counts_rows_dropped_by_collection_cap() {
        let config = ReportConfig {
            max_errors: 10,
            max_collected: 2,
            ..ReportConfig::summary()
        };
        let text = render(&not_found(4), config);
        assert!(text.starts_with("## Errors (4)"));
        assert!(text.contains("/missing/1"));
        assert!(!text.contains("/missing/2"));
        assert!(text.contains("_... and 2 more errors_"));
    }
}
