mod cmd;
mod migrations;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::init::Backend;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "strata",
    about = "Apply, roll back and inspect ordered, reversible migrations",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from strata.yaml or .strata)
    #[arg(long, global = true, env = "STRATA_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write strata.yaml selecting the state store
    Init {
        #[arg(long, value_enum, default_value_t = Backend::File)]
        backend: Backend,

        /// State file or database path, relative to the root
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Apply all outstanding migrations
    Migrate {
        /// Revert and re-apply the last migration when nothing is outstanding
        #[arg(long)]
        redo_last: bool,
    },

    /// Revert applied migrations down to and including ID
    Rollback { id: String },

    /// Revert every applied migration
    Reset,

    /// Revert everything, then apply everything again
    Refresh,

    /// Show which migrations are applied
    Status,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Init { .. } | Commands::Status => tracing::Level::WARN,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init { backend, path } => cmd::init::run(&root, backend, path, cli.json),
        Commands::Migrate { redo_last } => cmd::run::migrate(&root, redo_last, cli.json),
        Commands::Rollback { id } => cmd::run::rollback(&root, &id, cli.json),
        Commands::Reset => cmd::run::reset(&root, cli.json),
        Commands::Refresh => cmd::run::refresh(&root, cli.json),
        Commands::Status => cmd::status::run(&root, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
