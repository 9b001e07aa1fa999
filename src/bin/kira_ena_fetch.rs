use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_ena_fetch::app::{App, FetchOptions, FetchRequest};
use kira_ena_fetch::config::ConfigLoader;
use kira_ena_fetch::ena::FtpSession;
use kira_ena_fetch::error::FetchError;
use kira_ena_fetch::output::{ConsoleOutput, JsonOutput, OutputMode};

#[derive(Parser)]
#[command(name = "kira-ena-fetch")]
#[command(about = "Fetch paired-end FASTQ files for a list of run accessions from the ENA FTP archive")]
#[command(version, author)]
struct Cli {
    /// Text file with one accession per line
    accession_list: PathBuf,

    /// Directory the FASTQ files are written to (created if absent)
    output_dir: PathBuf,

    /// JSON config file overriding host, base path, credentials or timeouts
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON report instead of progress lines
    #[arg(long)]
    json: bool,

    /// List planned transfers without connecting
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(report) = run(cli) {
        eprintln!("{report:?}");
        if let Some(err) = report.downcast_ref::<FetchError>() {
            tracing::debug!(kind = ?err.kind(), "run aborted");
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(cli: Cli) -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let app = App::new(config);
    tracing::debug!(
        host = %app.config().host,
        base_path = %app.config().base_path,
        "resolved archive settings"
    );
    let request = FetchRequest {
        accession_list: cli.accession_list,
        output_dir: cli.output_dir,
    };
    let options = FetchOptions {
        dry_run: cli.dry_run,
    };

    match output_mode {
        OutputMode::Human => {
            let report = app.fetch(&request, options, FtpSession::connect, &ConsoleOutput)?;
            tracing::info!(
                downloaded = report.summary.downloaded,
                failed = report.summary.failed,
                "batch finished"
            );
            Ok(())
        }
        OutputMode::Json => {
            let report = app.fetch(&request, options, FtpSession::connect, &JsonOutput)?;
            JsonOutput::print_report(&report).into_diagnostic()?;
            Ok(())
        }
    }
}
