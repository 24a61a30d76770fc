mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{account::AccountSubcommand, action::ActionSubcommand, config::ConfigSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "warmup",
    about = "Track account warmup stages and decide which actions an account may take",
    version,
    propagate_version = true
)]
struct Cli {
    /// Directory holding .warmup/ (default: search upward from cwd)
    #[arg(long, global = true, env = "WARMUP_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .warmup/ with a default config and an empty account store
    Init,

    /// Register and manage accounts
    Account {
        #[command(subcommand)]
        subcommand: AccountSubcommand,
    },

    /// Check or record actions for an account
    Action {
        #[command(subcommand)]
        subcommand: ActionSubcommand,
    },

    /// Re-evaluate warmup stages for every eligible account
    Sweep,

    /// Warmup progress for one account
    Status {
        /// Account id or username
        account: String,
    },

    /// Recent activity, newest first
    Activity {
        /// Restrict to one account (id or username)
        #[arg(long)]
        account: Option<String>,
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Account { subcommand } => cmd::account::run(&root, subcommand, cli.json),
        Commands::Action { subcommand } => cmd::action::run(&root, subcommand, cli.json),
        Commands::Sweep => cmd::sweep::run(&root, cli.json),
        Commands::Status { account } => cmd::status::run(&root, &account, cli.json),
        Commands::Activity { account, limit } => {
            cmd::activity::run(&root, account.as_deref(), limit, cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
