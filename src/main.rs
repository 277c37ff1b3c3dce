use std::path::PathBuf;

use clap::Parser;
use sheet_merger::config::{Config, DEFAULT_CONFIG_PATH};
use sheet_merger::{Result, ToolError, merge};
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose) {
        eprintln!("error: {error}");
    }

    info!("merge started");
    if let Err(error) = run(cli) {
        error!(%error, "merge aborted");
        std::process::exit(1);
    }
    info!("merge finished");
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?.with_overrides(cli.dest, cli.copy_column);
    merge::run(&config)?;
    Ok(())
}

/// Installs a stderr subscriber. RUST_LOG wins over the default level.
fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Concatenate the first sheet of several workbooks into one sheet."
)]
struct Cli {
    /// YAML configuration listing the destination and source workbooks.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Destination workbook, overriding `dest_path`.
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Address pattern such as "^(A|B).*", overriding `copy_column`.
    #[arg(long)]
    copy_column: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short)]
    verbose: bool,
}
