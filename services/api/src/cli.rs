use crate::demo::{run_demo, run_report, run_zip_rankings, DemoArgs, ReportArgs, ZipsArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use demand_intel::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Demand Intelligence",
    about = "Score households, rank ZIP codes and assemble demand reports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Generate and print an intelligence report for one geography
    Report(ReportArgs),
    /// Rank ZIP codes by adjusted demand score
    Zips(ZipsArgs),
    /// Run the engine end to end against a built-in synthetic dataset
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Directory of CSV files to load (overrides INTEL_DATASET_DIR)
    #[arg(long)]
    pub(crate) dataset: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Report(args) => run_report(args),
        Command::Zips(args) => run_zip_rankings(args),
        Command::Demo(args) => run_demo(args),
    }
}
