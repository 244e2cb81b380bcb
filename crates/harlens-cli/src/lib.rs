use clap::ValueEnum;
use harlens_report::ReportMode;

pub mod commands;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Markdown report
    Pretty,
    /// Aggregated statistics as JSON
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    Summary,
    Forensic,
}

impl From<ModeArg> for ReportMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Summary => ReportMode::Summary,
            ModeArg::Forensic => ReportMode::Forensic,
        }
    }
}
