use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use cnvtbot::cli::setup;
use cnvtbot::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for cnvtbot::AppCommand {
    fn from(cmd: Commands) -> cnvtbot::AppCommand {
        match cmd {
            Commands::Run => cnvtbot::AppCommand::Run,
            Commands::Convert { from, to, amount } => {
                cnvtbot::AppCommand::Convert { from, to, amount }
            }
            Commands::Rates { codes } => cnvtbot::AppCommand::Rates { codes },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Run the Telegram bot
    Run,
    /// Convert an amount using today's rates
    Convert {
        /// Currency to convert from, e.g. USD
        from: String,
        /// Currency to convert to, e.g. EUR
        to: String,
        /// Amount to convert
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Show today's rates, optionally only for the given currencies
    Rates { codes: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // The bot logs its activity; one-shot commands only print their output.
    let quiet = !matches!(cli.command, Some(Commands::Run));
    init_logging(cli.verbose, quiet);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => setup::setup_at_path(path),
            None => setup::setup(),
        },
        Some(cmd) => cnvtbot::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
