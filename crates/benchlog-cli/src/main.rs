mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{append::AppendArgs, config::ConfigSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "benchlog",
    about = "Append-only benchmark history: record CI runs per suite and query them",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .benchlog/ or .git/)
    #[arg(long, global = true, env = "BENCHLOG_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .benchlog/ with a default config and an empty ledger
    Init {
        /// Repository URL written into exported chart data
        #[arg(long)]
        repo_url: Option<String>,
    },

    /// Record a benchmark run for a suite
    Append(AppendArgs),

    /// Show the run history of a suite
    History {
        suite: String,
        /// Only runs at or after this time (ms since epoch)
        #[arg(long)]
        from: Option<i64>,
        /// Only runs at or before this time (ms since epoch)
        #[arg(long)]
        to: Option<i64>,
    },

    /// Show the most recent run of a suite
    Latest { suite: String },

    /// List recorded suites
    Suites,

    /// Append every run from an existing chart data file (data.js)
    Import { file: PathBuf },

    /// Write chart data (window.BENCHMARK_DATA) for the charts page
    Export {
        /// Output path (default: export.path from config)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Keep only the newest N runs of each suite
        #[arg(long)]
        max_items: Option<usize>,
    },

    /// Inspect the project configuration
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
        Commands::Init { repo_url } => cmd::init::run(&root, repo_url.as_deref(), cli.json),
        Commands::Append(args) => cmd::append::run(&root, args, cli.json),
        Commands::History { suite, from, to } => {
            cmd::history::history(&root, &suite, from, to, cli.json)
        }
        Commands::Latest { suite } => cmd::history::latest(&root, &suite, cli.json),
        Commands::Suites => cmd::history::suites(&root, cli.json),
        Commands::Import { file } => cmd::chart::import(&root, &file, cli.json),
        Commands::Export { out, max_items } => {
            cmd::chart::export(&root, out.as_deref(), max_items, cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
