use crate::OutputFormat;
use anyhow::{Context, Result};
use harlens_core::analysis::{Analyzer, EntryAggregator, TrafficStats};
use harlens_core::har::HarReader;
use harlens_core::{ConfigOverrides, ReportConfig};
use harlens_report::ReportMode;
use std::fs;
use std::path::{Path, PathBuf};

/// `<config_dir>/harlens/config.json`, when the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("harlens").join("config.json"))
}

/// Read a JSON overrides file
pub fn read_overrides(path: &Path) -> Result<ConfigOverrides> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

/// Preset for the mode, then the config file, then command line flags
///
/// An explicit `config_path` must exist; the default location is optional.
pub fn load_config(
    mode: ReportMode,
    config_path: Option<&Path>,
    flags: ConfigOverrides,
) -> Result<ReportConfig> {
    let preset = match mode {
        ReportMode::Summary => ReportConfig::summary(),
        ReportMode::Forensic => ReportConfig::forensic(),
    };

    let from_file = match config_path {
        Some(path) => read_overrides(path)?,
        None => match default_config_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Using config file {}", path.display());
                read_overrides(&path)?
            }
            _ => ConfigOverrides::default(),
        },
    };

    Ok(preset.with_overrides(&from_file.merge(flags)))
}

/// Render the text report for a capture file
///
/// Decode problems come back as report text; only I/O failures are errors.
pub fn analyze_file(file: &Path, mode: ReportMode, config: &ReportConfig) -> Result<String> {
    tracing::debug!("Reading HAR file: {}", file.display());
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read HAR file {}", file.display()))?;
    Ok(harlens_report::analyze_with(&text, mode, config))
}

/// Aggregated statistics for a capture file
pub fn traffic_stats(file: &Path, config: &ReportConfig) -> Result<TrafficStats> {
    let har = HarReader::from_file(file)
        .with_context(|| format!("Failed to load {}", file.display()))?;
    if har.log.entries.is_empty() {
        anyhow::bail!(harlens_core::Error::EmptyCapture);
    }
    Ok(EntryAggregator::new(config.clone()).analyze(&har)?)
}

pub fn execute(
    file: &Path,
    mode: ReportMode,
    config: &ReportConfig,
    format: OutputFormat,
) -> Result<()> {
    tracing::info!("Analyzing HAR file: {}", file.display());

    match format {
        OutputFormat::Json => {
            let stats = traffic_stats(file, config)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Pretty => {
            use console::style;

            let report = analyze_file(file, mode, config)?;
            println!("{}", report);
            eprintln!(
                "{} {} report for {} ({} characters)",
                style("✓").green().bold(),
                mode.as_str(),
                file.display(),
                report.chars().count()
            );
        }
    }

    Ok(())
}
