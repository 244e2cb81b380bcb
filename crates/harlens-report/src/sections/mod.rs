//! Section builders.
//!
//! Each builder is a pure function of the [`ReportContext`] returning one
//! block of markdown; an empty string means the section has nothing to say.

mod api;
mod caching;
mod cookies;
mod detail;
mod domains;
mod errors;
mod overview;
mod performance;
mod realtime;
mod redirects;
mod security;

pub use api::{EndpointTemplate, infer_endpoints, template_path};
pub use detail::{detail_score, select_detailed};
pub use security::{SecurityFinding, collect_findings};

use crate::context::ReportContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Overview,
    Domains,
    Cookies,
    Security,
    Performance,
    ApiSurface,
    Redirects,
    Realtime,
    Errors,
    Caching,
    Detail,
}

impl Section {
    pub fn build(&self, ctx: &ReportContext) -> String {
        let lines = match self {
            Section::Overview => overview::build(ctx),
            Section::Domains => domains::build(ctx),
            Section::Cookies => cookies::build(ctx),
            Section::Security => security::build(ctx),
            Section::Performance => performance::build(ctx),
            Section::ApiSurface => api::build(ctx),
            Section::Redirects => redirects::build(ctx),
            Section::Realtime => realtime::build(ctx),
            Section::Errors => errors::build(ctx),
            Section::Caching => caching::build(ctx),
            Section::Detail => detail::build(ctx),
        };
        lines.join("\n")
    }
}

pub(crate) fn percent(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Trailing note for a capped list, `None` when nothing was left out
pub(crate) fn omitted(hidden: usize, what: &str) -> Option<String> {
    (hidden > 0).then(|| format!("_... and {} more {}_", hidden, what))
}

/// Escape characters that would break a markdown table cell
pub(crate) fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
