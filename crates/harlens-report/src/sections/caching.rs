use super::omitted;
use crate::context::ReportContext;
use harlens_core::format;

const MAX_CACHING_SHOWN: usize = 15;

pub(super) fn build(ctx: &ReportContext) -> Vec<String> {
    let caching = &ctx.stats.caching_issues;
    let compression = &ctx.stats.compression;
    let mut lines = Vec::new();

    if !caching.is_empty() {
        lines.push(format!("## Caching Issues ({})", caching.total()));
        let shown = caching.len().min(MAX_CACHING_SHOWN);
        for record in caching.iter().take(shown) {
            let issues: Vec<String> = record.issues.iter().map(|i| i.to_string()).collect();
            lines.push(format!(
                "- `{}` ({})",
                format::truncate(&record.url, 100),
                record.mime
            ));
            lines.push(format!(
                "  - {} | Cache-Control: {}",
                issues.join(", "),
                record.cache_control
            ));
        }
        if let Some(note) = omitted(
            caching.total().saturating_sub(shown),
            "assets with caching issues",
        ) {
            lines.push(note);
        }
    }

    if compression.compressed > 0 || compression.uncompressed > 0 {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("## Compression".to_string());
        lines.push(format!(
            "- **Compressed responses:** {}",
            compression.compressed
        ));
        lines.push(format!(
            "- **Compressible but uncompressed (>1KB):** {}",
            compression.uncompressed
        ));
        lines.push(format!(
            "- **Bytes saved by compression:** {}",
            format::format_size(compression.savings)
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use crate::context::{ReportContext, ReportMode};
    use crate::sections::Section;
    use harlens_core::ReportConfig;
    use harlens_core::analysis::EntryAggregator;
    use harlens_core::har::{Content, Entry, Header, Request, Response};

    fn asset(url: &str, mime: &str, headers: &[(&str, &str)]) -> Entry {
        Entry {
            request: Request {
                method: "GET".to_string(),
                url: url.to_string(),
                ..Default::default()
            },
            response: Response {
                status: 200,
                headers: headers
                    .iter()
                    .map(|(n, v)| Header {
                        name: n.to_string(),
                        value: v.to_string(),
                    })
                    .collect(),
                content: Content {
                    mime_type: mime.to_string(),
                    size: 1000,
                    ..Default::default()
                },
                body_size: 200,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn render(entries: &[Entry]) -> String {
        let config = ReportConfig::summary();
        let stats = EntryAggregator::new(config.clone()).aggregate(entries);
        let ctx = ReportContext {
            entries,
            stats: &stats,
            config: &config,
            mode: ReportMode::Summary,
        };
        Section::Caching.build(&ctx)
    }

    #[test]
    fn test_caching_issue_listed() {
        let text = render(&[asset(
            "https://example.com/app.js",
            "application/javascript",
            &[("Cache-Control", "max-age=60")],
        )]);
        assert!(text.starts_with("## Caching Issues (1)"));
        assert!(text.contains(
            "  - Short max-age (60s), No validation headers (ETag/Last-Modified) | Cache-Control: max-age=60"
        ));
    }

    #[test]
    fn test_compression_savings_summary() {
        let text = render(&[asset(
            "https://example.com/data",
            "application/json",
            &[("Content-Encoding", "gzip")],
        )]);
        assert!(text.contains("- **Compressed responses:** 1"));
        assert!(text.contains("- **Bytes saved by compression:** 800B"));
        assert!(!text.contains("Caching Issues"));
    }
}
