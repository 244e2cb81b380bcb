use super::types::Har;
use crate::{Error, Result};
use std::fs;
use std::path::Path;

pub struct HarReader;

impl HarReader {
    /// Read and parse a HAR file from the given path
    pub fn from_file(path: &Path) -> Result<Har> {
        tracing::debug!("Reading HAR file from: {}", path.display());

        let content = fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a HAR document from a JSON string
    ///
    /// Missing fields default; only text that is not a JSON document of the
    /// HAR shape fails, with [`Error::MalformedInput`].
    pub fn from_str(content: &str) -> Result<Har> {
        tracing::debug!("Parsing HAR from string ({} bytes)", content.len());

        let har: Har = serde_json::from_str(content)?;

        tracing::info!(
            "Successfully parsed HAR with {} entries",
            har.log.entries.len()
        );

        Ok(har)
    }

    /// Parse a capture that must contain at least one entry
    pub fn parse_capture(content: &str) -> Result<Har> {
        let har = Self::from_str(content)?;
        if har.log.entries.is_empty() {
            tracing::warn!("HAR file contains no entries");
            return Err(Error::EmptyCapture);
        }
        Ok(har)
    }

    /// Cheap check that a piece of text is worth parsing as a HAR document
    ///
    /// Used on every chat message, so the expensive structural check only runs
    /// once the text starts like a JSON object mentioning `"log"`.
    pub fn looks_like_har(content: &str) -> bool {
        let trimmed = content.trim_start();
        if !trimmed.starts_with('{') || !trimmed.contains("\"log\"") {
            return false;
        }

        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(value) => value
                .get("log")
                .and_then(|log| log.get("entries"))
                .is_some_and(|entries| entries.is_array()),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_har() {
        let har_json = r#"{
            "log": {
                "version": "1.2",
                "creator": {"name": "test", "version": "1.0"},
                "entries": []
            }
        }"#;

        let har = HarReader::from_str(har_json).unwrap();
        assert_eq!(har.log.version, "1.2");
        assert_eq!(har.log.entries.len(), 0);
    }

    #[test]
    fn test_malformed_json_is_malformed_input() {
        let err = HarReader::from_str("{not json").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        assert!(err.to_string().starts_with("Error parsing HAR file:"));
    }

    #[test]
    fn test_wrong_shape_is_malformed_input() {
        let err = HarReader::from_str(r#"{"log": {"entries": 5}}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_empty_capture() {
        let err = HarReader::parse_capture(r#"{"log": {"entries": []}}"#).unwrap_err();
        assert!(matches!(err, Error::EmptyCapture));
        assert_eq!(err.to_string(), "No entries found in HAR file");
    }

    #[test]
    fn test_missing_log_is_empty() {
        let err = HarReader::parse_capture("{}").unwrap_err();
        assert!(matches!(err, Error::EmptyCapture));
    }

    #[test]
    fn test_looks_like_har() {
        assert!(HarReader::looks_like_har(r#"  {"log": {"entries": []}}"#));
        assert!(!HarReader::looks_like_har("what is wrong with my site?"));
        assert!(!HarReader::looks_like_har(r#"{"log": "plain"}"#));
        assert!(!HarReader::looks_like_har(r#"{"log": {"entries": [}"#));
    }
}
