//! Turns a HAR capture into a bounded text report.
//!
//! The pipeline is: parse, aggregate once, run the mode's section builders
//! over the same entries, then join and truncate to the character budget.

mod assembler;
mod context;
pub mod intercept;
pub mod sections;

pub use assembler::{ReportAssembler, TRUNCATION_MARKER};
pub use context::{ReportContext, ReportMode};
pub use intercept::Interceptor;

use harlens_core::analysis::EntryAggregator;
use harlens_core::har::{Har, HarReader};
use harlens_core::{Error, ReportConfig};

/// Summary report with default settings
///
/// Never fails: decode problems come back as the report text itself.
pub fn analyze(capture_text: &str) -> String {
    analyze_with(capture_text, ReportMode::Summary, &ReportConfig::summary())
}

/// Report for raw capture text in the given mode
pub fn analyze_with(capture_text: &str, mode: ReportMode, config: &ReportConfig) -> String {
    match HarReader::parse_capture(capture_text) {
        Ok(har) => render(&har, mode, config),
        Err(err @ (Error::MalformedInput(_) | Error::EmptyCapture)) => err.to_string(),
        Err(err) => {
            tracing::warn!("Unexpected error while reading capture: {}", err);
            err.to_string()
        }
    }
}

/// Report for an already parsed capture
pub fn render(har: &Har, mode: ReportMode, config: &ReportConfig) -> String {
    let entries = &har.log.entries;
    if entries.is_empty() {
        return Error::EmptyCapture.to_string();
    }

    let stats = EntryAggregator::new(config.clone()).aggregate(entries);
    let ctx = ReportContext {
        entries,
        stats: &stats,
        config,
        mode,
    };

    let sections: Vec<String> = mode
        .sections()
        .iter()
        .map(|section| section.build(&ctx))
        .collect();

    let report = ReportAssembler::new(config.max_report_chars).assemble(sections);
    tracing::info!(
        "Built {} report: {} entries, {} characters",
        mode.as_str(),
        entries.len(),
        report.chars().count()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_message() {
        let report = analyze("{\"log\": ");
        assert!(report.starts_with("Error parsing HAR file:"));
    }

    #[test]
    fn test_empty_capture_message() {
        assert_eq!(
            analyze(r#"{"log": {"entries": []}}"#),
            "No entries found in HAR file"
        );
    }

    #[test]
    fn test_float_sizes_and_null_entry_still_report() {
        let capture = r#"{"log": {"entries": [
            {"time": 20, "request": {"method": "GET", "url": "https://a.com/"},
             "response": {"status": 200, "content": {"mimeType": "text/html", "size": 10}}},
            {"time": 30, "request": {"method": "POST", "url": "https://a.com/upload", "bodySize": 512.0},
             "response": {"status": 201, "content": {"mimeType": "application/json", "size": 2048.5}}},
            null
        ]}}"#;
        let report = analyze(capture);
        assert!(report.starts_with("# HAR Analysis Report"));
        assert!(report.contains("- **Total Requests:** 3"));
    }

    #[test]
    fn test_report_is_deterministic() {
        let capture = r#"{"log": {"entries": [
            {"time": 1200, "request": {"method": "GET", "url": "https://a.com/"},
             "response": {"status": 200, "content": {"mimeType": "text/html", "size": 10}}},
            {"time": 5, "request": {"method": "GET", "url": "https://b.net/x.js"},
             "response": {"status": 404, "content": {"mimeType": "application/javascript"}}}
        ]}}"#;
        let config = ReportConfig::forensic();
        let first = analyze_with(capture, ReportMode::Forensic, &config);
        let second = analyze_with(capture, ReportMode::Forensic, &config);
        assert_eq!(first, second);
    }
}
