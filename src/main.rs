use anyhow::Result;
use clap::{Parser, Subcommand};
use cotacao::core::log::init_logging;

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

impl From<Commands> for cotacao::AppCommand {
    fn from(cmd: Commands) -> cotacao::AppCommand {
        match cmd {
            Commands::Run => cotacao::AppCommand::Run,
            Commands::Serve => cotacao::AppCommand::Serve,
            Commands::Fetch => cotacao::AppCommand::Fetch,
            Commands::History { limit } => cotacao::AppCommand::History { limit },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Start the quote service, wait for it and fetch one quote (default)
    Run,
    /// Only run the quote service
    Serve,
    /// Fetch one quote from a running service and write it to the output file
    Fetch,
    /// Show the most recently stored quotes
    History {
        /// Number of quotes to show
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Setup => cotacao::cli::setup::setup(),
        cmd => cotacao::run_command(cmd.into(), cli.config_path.as_deref()).await,
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
