use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use uconv::core::log::init_logging;
use uconv::core::{ConversionRequest, UnitCategory};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Fetch a live exchange-rate snapshot instead of using the configured source
    #[arg(short, long, global = true)]
    live: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for uconv::AppCommand {
    fn from(cmd: Commands) -> uconv::AppCommand {
        match cmd {
            Commands::Convert {
                value,
                from,
                to,
                json,
            } => uconv::AppCommand::Convert {
                request: ConversionRequest::new(value, &from, &to),
                json,
            },
            Commands::Units { category } => uconv::AppCommand::Units { category },
            Commands::Rates => uconv::AppCommand::Rates,
            Commands::Interactive => uconv::AppCommand::Interactive,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert a value between two units or currencies
    Convert {
        /// Value to convert
        #[arg(allow_negative_numbers = true)]
        value: f64,
        /// Unit or currency to convert from, e.g. kilometer or USD
        from: String,
        /// Unit or currency to convert to, e.g. mile or EUR
        to: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List unit categories and their units
    Units {
        /// Only show this category
        category: Option<UnitCategory>,
    },
    /// Display the exchange-rate table
    Rates,
    /// Convert values through an interactive form
    Interactive,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => uconv::cli::setup::setup_at_path(path),
            None => uconv::cli::setup::setup(),
        },
        Some(cmd) => uconv::run_command(cmd.into(), cli.config_path.as_deref(), cli.live).await,
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
