/// Appended when a report is cut at the character budget
pub const TRUNCATION_MARKER: &str = "\n\n[... report truncated: character budget reached ...]";

const SECTION_SEPARATOR: &str = "\n\n";

/// Joins section texts and enforces the character budget
pub struct ReportAssembler {
    max_chars: usize,
}

impl ReportAssembler {
    /// Budgets shorter than [`TRUNCATION_MARKER`] are raised to its length
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(TRUNCATION_MARKER.chars().count()),
        }
    }

    /// Empty sections are skipped. Output length, marker included, never
    /// exceeds the budget, and a cut report always ends with the marker.
    pub fn assemble(&self, sections: Vec<String>) -> String {
        let report = sections
            .iter()
            .map(|s| s.trim_end())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR);

        let length = report.chars().count();
        if length <= self.max_chars {
            return report;
        }

        tracing::warn!(
            "Report is {} characters, truncating to {}",
            length,
            self.max_chars
        );

        let marker_len = TRUNCATION_MARKER.chars().count();
        let mut truncated: String = report.chars().take(self.max_chars - marker_len).collect();
        truncated.push_str(TRUNCATION_MARKER);
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_non_empty_sections_in_order() {
        let report = ReportAssembler::new(1000).assemble(vec![
            "## A".to_string(),
            String::new(),
            "## B\n".to_string(),
        ]);
        assert_eq!(report, "## A\n\n## B");
    }

    #[test]
    fn test_truncates_to_budget_with_marker() {
        let long = "x".repeat(500);
        let report = ReportAssembler::new(200).assemble(vec![long]);
        assert_eq!(report.chars().count(), 200);
        assert!(report.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_budget_counts_characters() {
        let report = ReportAssembler::new(100).assemble(vec!["é".repeat(300)]);
        assert_eq!(report.chars().count(), 100);
        assert!(report.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_tiny_budget_still_ends_with_marker() {
        let report = ReportAssembler::new(10).assemble(vec!["x".repeat(200)]);
        assert_eq!(report, TRUNCATION_MARKER);

        let short = ReportAssembler::new(10).assemble(vec!["abcdefghij".to_string()]);
        assert_eq!(short, "abcdefghij");
    }
}
