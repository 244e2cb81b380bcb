use super::omitted;
use crate::context::ReportContext;
use harlens_core::format;

pub(super) fn build(ctx: &ReportContext) -> Vec<String> {
    let redirects = &ctx.stats.redirects;
    if redirects.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![format!("## Redirects ({})", redirects.total())];
    let shown = redirects.len().min(ctx.config.max_redirects);
    for redirect in redirects.iter().take(shown) {
        let target = if redirect.to.is_empty() {
            "(no Location)".to_string()
        } else {
            format::truncate(&redirect.to, 120)
        };
        lines.push(format!(
            "- **{}** {} -> {}",
            redirect.status,
            format::truncate(&redirect.from, 120),
            target
        ));
    }

    if let Some(note) = omitted(redirects.total().saturating_sub(shown), "redirects") {
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
    use harlens_core::har::{Entry, Header, Request, Response};

    fn redirect(from: &str, to: &str) -> Entry {
        Entry {
            request: Request {
                method: "GET".to_string(),
                url: from.to_string(),
                ..Default::default()
            },
            response: Response {
                status: 301,
                headers: vec![Header {
                    name: "Location".to_string(),
                    value: to.to_string(),
                }],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_redirects_capped_per_mode() {
        let entries: Vec<_> = (0..12)
            .map(|i| {
                redirect(
                    &format!("http://example.com/{}", i),
                    &format!("https://example.com/{}", i),
                )
            })
            .collect();

        for (config, mode, shown) in [
            (ReportConfig::summary(), ReportMode::Summary, 10),
            (ReportConfig::forensic(), ReportMode::Forensic, 12),
        ] {
            let stats = EntryAggregator::new(config.clone()).aggregate(&entries);
            let ctx = ReportContext {
                entries: &entries,
                stats: &stats,
                config: &config,
                mode,
            };
            let text = Section::Redirects.build(&ctx);
            assert_eq!(text.matches("- **301**").count(), shown);
            assert!(text.contains("- **301** http://example.com/0 -> https://example.com/0"));
        }
    }
}
