//! Command-line interface for the repository insights binary.
//!
//! `serve` (the default) exposes the HTTP API; `analyze` runs a single
//! analysis and prints the combined document.

use std::{io, net::SocketAddr, process, time::Duration};

use clap::{ArgAction, Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use repo_insights::{AnalysisReport, AnalysisRequest, Error, Insights, Settings};
use tracing::info;

const DEFAULT_BIND: &str = "0.0.0.0:5000";

/// Command line interface for the insights aggregator.
#[derive(Debug, Parser,)]
#[command(
    name = "repo-insights",
    version,
    about = "Aggregate GitHub repository insights",
    args_conflicts_with_subcommands = true
)]
struct Cli
{
    #[command(subcommand)]
    command: Option<Command,>,

    /// Serve options used when no subcommand is given.
    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Serve the HTTP API.
    Serve(ServeArgs,),
    /// Analyze one repository and print the combined JSON document.
    Analyze(AnalyzeArgs,),
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `serve` subcommand.
struct ServeArgs
{
    /// Socket address the HTTP listener binds to.
    #[arg(long = "bind", env = "REPO_INSIGHTS_BIND", default_value = DEFAULT_BIND)]
    bind: SocketAddr,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `analyze` subcommand.
struct AnalyzeArgs
{
    /// Repository as `owner/repo` or a GitHub repository URL.
    #[arg(value_name = "REPOSITORY")]
    reference: String,

    /// Output formatted JSON for easier inspection.
    #[arg(long = "pretty", action = ArgAction::SetTrue)]
    pretty: bool,

    #[command(flatten)]
    settings: Settings,
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main()
{
    if let Err(error,) = run() {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

/// Loads `.env`, parses arguments and dispatches to the selected command.
///
/// # Errors
///
/// Propagates configuration, bind and analysis failures.
fn run() -> Result<(), Error,>
{
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::service(format!("failed to start async runtime: {e}"),),)?;

    match cli.command {
        Some(Command::Serve(args,),) => runtime.block_on(run_serve(args,),),
        Some(Command::Analyze(args,),) => runtime.block_on(run_analyze(args,),),
        None => runtime.block_on(run_serve(cli.serve,),),
    }
}

async fn run_serve(args: ServeArgs,) -> Result<(), Error,>
{
    repo_insights::init_tracing(&args.settings.log_filter,);
    info!(
        "Starting repo-insights {} (GitHub API at {})",
        env!("CARGO_PKG_VERSION"),
        args.settings.api_base_url
    );
    if args.settings.github_token().is_none() {
        info!("GITHUB_TOKEN not set; requests are unauthenticated");
    }

    let insights = Insights::from_settings(args.settings,)?;
    repo_insights::serve(insights, args.bind,).await
}

async fn run_analyze(args: AnalyzeArgs,) -> Result<(), Error,>
{
    repo_insights::init_tracing(&args.settings.log_filter,);
    let request = AnalysisRequest::from_reference(&args.reference,)?;
    let insights = Insights::from_settings(args.settings,)?;

    let pb = ProgressBar::new_spinner();
    if let Ok(style,) =
        ProgressStyle::default_spinner().template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
    {
        pb.set_style(style,);
    }
    pb.enable_steady_tick(Duration::from_millis(100,),);
    pb.set_message(format!("Analyzing {}/{}...", request.owner, request.repo),);

    let result = insights.analyze(&request,).await;
    pb.finish_and_clear();

    let report = result.map_err(|failure| Error::service(failure.to_string(),),)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_report(&mut handle, &report, args.pretty,)
}

fn write_report<W: io::Write,>(writer: &mut W, report: &AnalysisReport, pretty: bool,)
-> Result<(), Error,>
{
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, report,)?;
    } else {
        serde_json::to_writer(&mut *writer, report,)?;
    }
    writeln!(writer).map_err(|e| Error::service(format!("failed to write report: {e}"),),)?;

    Ok((),)
}
