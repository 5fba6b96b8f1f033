mod cmd;
mod output;
mod root;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "todosync",
    about = "Keep a markdown task checklist in sync with GitHub issues and a project board",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .todosync/ or .git/)
    #[arg(long, global = true, env = "TODOSYNC_ROOT")]
    root: Option<PathBuf>,

    /// Checklist document (default: `document` from the config, TODO.md)
    #[arg(long, global = true, env = "TODOSYNC_FILE")]
    file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Log progress at info level
    #[arg(long, global = true, short = 'v')]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tasks parsed from the checklist
    Tasks,

    /// Report overdue, due-today and upcoming tasks
    Deadlines {
        /// Look-ahead window in days (default: deadlines.threshold_days)
        #[arg(long)]
        days: Option<i64>,

        /// Evaluate as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Push checklist state to issues and the project board
    Push {
        /// Show the planned actions without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Do not commit the checklist afterwards
        #[arg(long)]
        no_commit: bool,
    },

    /// Pull issue and board state into the checklist
    Pull {
        /// Show the line changes without rewriting the checklist
        #[arg(long)]
        dry_run: bool,

        /// Do not commit the checklist afterwards
        #[arg(long)]
        no_commit: bool,
    },

    /// Show the project board grouped by status
    Dashboard,

    /// Inspect and validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let json = cli.json;
    let file = cli.file;
    let workspace = || cmd::Workspace::load(&root, file.as_deref());

    let result = match cli.command {
        Commands::Tasks => workspace().and_then(|ws| cmd::tasks::run(&ws, json)),
        Commands::Deadlines { days, today } => {
            workspace().and_then(|ws| cmd::deadlines::run(&ws, days, today, json))
        }
        Commands::Push { dry_run, no_commit } => {
            workspace().and_then(|ws| cmd::push::run(&ws, dry_run, no_commit, json))
        }
        Commands::Pull { dry_run, no_commit } => {
            workspace().and_then(|ws| cmd::pull::run(&ws, dry_run, no_commit, json))
        }
        Commands::Dashboard => workspace().and_then(|ws| cmd::dashboard::run(&ws, json)),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
