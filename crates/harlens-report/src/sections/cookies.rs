use super::omitted;
use crate::context::ReportContext;
use harlens_detectors::CookieTracker;

const MAX_INSECURE_SHOWN: usize = 5;
const MAX_CROSS_DOMAIN_SHOWN: usize = 20;
const MAX_DOMAINS_LISTED: usize = 5;

pub(super) fn build(ctx: &ReportContext) -> Vec<String> {
    let cookies = &ctx.stats.cookies;
    let report = CookieTracker::track(ctx.entries);

    if cookies.sent == 0
        && cookies.received == 0
        && report.fan_out.is_empty()
        && report.set_cookies.is_empty()
    {
        return Vec::new();
    }

    let mut lines = vec![
        "## Cookies".to_string(),
        format!("- **Sent:** {}", cookies.sent),
        format!("- **Received:** {}", cookies.received),
    ];

    if !cookies.insecure.is_empty() {
        lines.push(format!(
            "- **Without Secure flag over HTTPS:** {}",
            cookies.insecure.total()
        ));
        for cookie in cookies.insecure.iter().take(MAX_INSECURE_SHOWN) {
            lines.push(format!("  - `{}` ({})", cookie.name, cookie.domain));
        }
    }

    let cross: Vec<_> = report.cross_domain().collect();
    if !cross.is_empty() {
        lines.push(String::new());
        lines.push(format!("### Cross-Domain Cookies ({})", cross.len()));
        for cookie in cross.iter().take(MAX_CROSS_DOMAIN_SHOWN) {
            let mut domains = cookie
                .domains
                .iter()
                .take(MAX_DOMAINS_LISTED)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            if cookie.domains.len() > MAX_DOMAINS_LISTED {
                domains.push_str(", ...");
            }
            let value_note = if cookie.same_value { ", same value" } else { "" };
            lines.push(format!(
                "- `{}` sent to {} domains ({}){}",
                cookie.name,
                cookie.domains.len(),
                domains,
                value_note
            ));
        }
        if let Some(note) = omitted(
            cross.len().saturating_sub(MAX_CROSS_DOMAIN_SHOWN),
            "cross-domain cookies",
        ) {
            lines.push(note);
        }
    }

    let flagged: Vec<_> = report
        .set_cookies
        .iter()
        .map(|(domain, audits)| {
            let issues: Vec<String> = audits
                .iter()
                .filter_map(|audit| {
                    let flags = audit.flags();
                    (!flags.is_empty()).then(|| {
                        let labels: Vec<String> = flags.iter().map(|f| f.to_string()).collect();
                        format!("`{}`: {}", audit.name, labels.join(", "))
                    })
                })
                .collect();
            (domain, issues)
        })
        .filter(|(_, issues)| !issues.is_empty())
        .collect();

    if !flagged.is_empty() {
        lines.push(String::new());
        lines.push("### Set-Cookie Audit".to_string());
        for (domain, issues) in flagged {
            lines.push(format!("- **{}**", domain));
            for issue in issues {
                lines.push(format!("  - {}", issue));
            }
        }
    }

    lines
}
