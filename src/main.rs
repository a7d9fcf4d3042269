use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use market_trends::core::Lookback;
use market_trends::core::log::init_logging;
use market_trends::export::ExportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Comma-separated return windows, e.g. "1D,1W,1M,3M,6M,YTD"
    #[arg(short, long, global = true)]
    periods: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Html,
    Pdf,
    All,
}

impl FormatArg {
    fn formats(self) -> Vec<ExportFormat> {
        match self {
            FormatArg::Html => vec![ExportFormat::Html],
            FormatArg::Pdf => vec![ExportFormat::Pdf],
            FormatArg::All => ExportFormat::ALL.to_vec(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display market trend tables in the terminal
    Show {
        /// Re-render every SECS seconds until interrupted
        #[arg(long, value_name = "SECS")]
        refresh: Option<u64>,
    },
    /// Export the dashboard as HTML and/or PDF reports
    Export {
        #[arg(short, long, value_enum, default_value = "all")]
        format: FormatArg,

        /// Directory for the report files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}

impl From<Commands> for market_trends::AppCommand {
    fn from(cmd: Commands) -> market_trends::AppCommand {
        match cmd {
            Commands::Show { refresh } => market_trends::AppCommand::Show { refresh },
            Commands::Export { format, output_dir } => market_trends::AppCommand::Export {
                formats: format.formats(),
                output_dir,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);
    let periods = cli.periods.as_deref().map(Lookback::parse_list).transpose()?;

    let result = match cli.command {
        Some(Commands::Setup) => match &cli.config_path {
            Some(path) => market_trends::cli::setup::setup_at_path(path),
            None => market_trends::cli::setup::setup(),
        },
        Some(cmd) => {
            market_trends::run_command(cmd.into(), cli.config_path.as_deref(), periods).await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
