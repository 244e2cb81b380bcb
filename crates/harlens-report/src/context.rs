use crate::sections::Section;
use harlens_core::ReportConfig;
use harlens_core::analysis::TrafficStats;
use harlens_core::har::Entry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    /// Compact report of the `analyze` entry point
    Summary,
    /// Full report with per-entry detail, used when intercepting messages
    Forensic,
}

impl ReportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportMode::Summary => "summary",
            ReportMode::Forensic => "forensic",
        }
    }

    /// Fixed section order of the mode
    pub fn sections(&self) -> &'static [Section] {
        match self {
            ReportMode::Summary => &[
                Section::Overview,
                Section::Performance,
                Section::Domains,
                Section::Realtime,
                Section::Errors,
                Section::Caching,
                Section::Security,
                Section::Redirects,
                Section::Cookies,
            ],
            ReportMode::Forensic => &[
                Section::Overview,
                Section::Domains,
                Section::Cookies,
                Section::Security,
                Section::Performance,
                Section::ApiSurface,
                Section::Redirects,
                Section::Detail,
            ],
        }
    }
}

/// Read-only inputs shared by every section builder
pub struct ReportContext<'a> {
    pub entries: &'a [Entry],
    pub stats: &'a TrafficStats,
    pub config: &'a ReportConfig,
    pub mode: ReportMode,
}
