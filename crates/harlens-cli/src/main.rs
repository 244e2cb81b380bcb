use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use harlens_cli::commands;
use harlens_cli::{ModeArg, OutputFormat};
use harlens_core::ConfigOverrides;
use harlens_report::ReportMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "harlens")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Turn HTTP Archive (HAR) captures into bounded, readable reports",
    long_about = "HarLens reads a browser HAR capture and writes a markdown report covering \
                  performance, security headers, caching, cookies, third-party domains and the \
                  inferred API surface. It can also rewrite chat message bodies so that an \
                  attached capture is replaced by its report."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a report for a HAR file
    Analyze {
        /// Path to the HAR file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        settings: ReportSettings,
    },

    /// Replace a HAR attachment in a chat message body with its report
    Intercept {
        /// Message body as JSON (reads stdin when omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// User id recorded in debug logs
        #[arg(long)]
        user: Option<String>,

        #[command(flatten)]
        settings: ReportSettings,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:\n  bash, zsh, fish, powershell, elvish\n\n\
                            INSTALLATION:\n  \
                            harlens completion --shell bash >> ~/.bashrc\n  \
                            harlens completion --shell zsh > ~/.zfunc/_harlens")]
    Completion {
        /// Target shell
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

/// Report settings shared by `analyze` and `intercept`
#[derive(clap::Args)]
struct ReportSettings {
    /// Report mode (defaults to summary for analyze, forensic for intercept)
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// JSON config file (defaults to <config dir>/harlens/config.json when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Requests slower than this are reported as slow
    #[arg(long, env = "HARLENS_SLOW_THRESHOLD_MS")]
    slow_threshold_ms: Option<f64>,

    /// Responses larger than this are reported as large
    #[arg(long, env = "HARLENS_LARGE_RESPONSE_KB")]
    large_response_kb: Option<u64>,

    /// Entries rendered in full in the forensic report
    #[arg(long, env = "HARLENS_MAX_DETAILED_ENTRIES")]
    max_detailed_entries: Option<usize>,

    /// Character budget of the whole report
    #[arg(long, env = "HARLENS_MAX_REPORT_CHARS")]
    max_report_chars: Option<usize>,

    /// Characters of each body shown in detailed entries
    #[arg(long, env = "HARLENS_MAX_BODY_CHARS")]
    max_body_chars: Option<usize>,

    /// Comma separated host names or globs rendered first in detailed entries
    #[arg(long, env = "HARLENS_PRIORITY_DOMAINS")]
    priority_domains: Option<String>,

    /// Leave request and response bodies out of detailed entries
    #[arg(long)]
    no_bodies: bool,

    /// Leave headers out of detailed entries
    #[arg(long)]
    no_headers: bool,

    /// Leave cookies out of detailed entries
    #[arg(long)]
    no_cookies: bool,
}

impl ReportSettings {
    fn mode(&self, default: ReportMode) -> ReportMode {
        self.mode.map(ReportMode::from).unwrap_or(default)
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            slow_threshold_ms: self.slow_threshold_ms,
            large_response_kb: self.large_response_kb,
            max_detailed_entries: self.max_detailed_entries,
            max_report_chars: self.max_report_chars,
            max_body_chars: self.max_body_chars,
            priority_domains: self.priority_domains.clone(),
            include_bodies: self.no_bodies.then_some(false),
            include_headers: self.no_headers.then_some(false),
            include_cookies: self.no_cookies.then_some(false),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze { file, settings } => {
            let mode = settings.mode(ReportMode::Summary);
            let config = commands::analyze::load_config(
                mode,
                settings.config.as_deref(),
                settings.overrides(),
            )?;
            commands::analyze::execute(&file, mode, &config, cli.format)
        }
        Commands::Intercept {
            file,
            user,
            settings,
        } => {
            let mode = settings.mode(ReportMode::Forensic);
            let config = commands::analyze::load_config(
                mode,
                settings.config.as_deref(),
                settings.overrides(),
            )?;
            commands::intercept::execute(file.as_deref(), config, user).await
        }
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "harlens=debug,harlens_cli=debug,harlens_core=debug,harlens_detectors=debug,harlens_report=debug",
        )
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
