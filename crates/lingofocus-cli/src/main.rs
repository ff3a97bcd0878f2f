use clap::{Parser, Subcommand};
use lingofocus_core::ChallengeCategory;

mod commands;

#[derive(Parser)]
#[command(name = "lingofocus-cli", version, about = "LingoFocus hearts CLI")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show hearts for every category
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Spend one heart of a category
    Consume {
        category: ChallengeCategory,
        /// Let an active streak shield absorb the attempt
        #[arg(long)]
        shield: bool,
        #[arg(long)]
        json: bool,
    },
    /// Apply pending refills and daily reset
    Refill {
        #[arg(long)]
        json: bool,
    },
    /// Out-of-hearts details for a category
    Blocked {
        category: ChallengeCategory,
        #[arg(long)]
        json: bool,
    },
    /// Subscription tier management
    Tier {
        #[command(subcommand)]
        action: commands::tier::TierAction,
    },
    /// Play one session of answers with a live streak shield
    Session {
        category: ChallengeCategory,
        /// Answer sequence: c = correct, x = wrong (e.g. "cccxx")
        #[arg(long)]
        answers: String,
        #[arg(long)]
        json: bool,
    },
    /// Run the refill ticker and print events as they happen
    Watch {
        /// How long to run
        #[arg(long, default_value = "60")]
        seconds: u64,
        /// Tick period (defaults to refill_check_interval_secs)
        #[arg(long)]
        period: Option<u64>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Status { json } => commands::hearts::status(json),
        Commands::Consume { category, shield, json } => {
            commands::hearts::consume(category, shield, json)
        }
        Commands::Refill { json } => commands::hearts::refill(json),
        Commands::Blocked { category, json } => commands::hearts::blocked(category, json),
        Commands::Tier { action } => commands::tier::run(action),
        Commands::Session { category, answers, json } => {
            commands::session::run(category, &answers, json)
        }
        Commands::Watch { seconds, period } => commands::watch::run(seconds, period),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
