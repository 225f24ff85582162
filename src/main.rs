mod commands;
mod config;
mod document;
mod graph;
mod store;
mod tui;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dlgedit",
    about = "A terminal node-graph editor for branching dialogue trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a fresh empty dialogue document
    New {
        #[arg(default_value = store::DEFAULT_FILE)]
        file: PathBuf,
    },
    /// Open the interactive canvas editor
    View {
        #[arg(default_value = store::DEFAULT_FILE)]
        file: PathBuf,
    },
    /// Parse a document and report what normalization would change (read-only)
    Check {
        #[arg(default_value = store::DEFAULT_FILE)]
        file: PathBuf,
    },
    /// Run schema migrations and rewrite the document in normalized form
    Migrate {
        #[arg(default_value = store::DEFAULT_FILE)]
        file: PathBuf,
        /// Write the result here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List all edges in graph order
    List {
        #[arg(default_value = store::DEFAULT_FILE)]
        file: PathBuf,
    },
    /// Query the graph for specific conditions
    #[command(
        group(
            ArgGroup::new("inspect_query")
                .args(["stats", "unreachable", "empty_targets"])
                .multiple(false)
        )
    )]
    Inspect {
        #[arg(default_value = store::DEFAULT_FILE)]
        file: PathBuf,
        /// Node and edge counts plus the graph-level scalars
        #[arg(long)]
        stats: bool,
        /// List nodes with no path from the start node
        #[arg(long)]
        unreachable: bool,
        /// List condition nodes carrying blank target ids
        #[arg(long)]
        empty_targets: bool,
    },
    /// Open the raw JSON document in your editor
    Edit {
        #[arg(default_value = store::DEFAULT_FILE)]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::New { file } => commands::new::run(&file),
        Command::View { file } => commands::view::run(&file),
        Command::Check { file } => commands::check::run(&file),
        Command::Migrate { file, output } => commands::migrate::run(&file, output.as_deref()),
        Command::List { file } => commands::list::run(&file),
        Command::Inspect {
            file,
            stats,
            unreachable,
            empty_targets,
        } => {
            if stats {
                commands::inspect::run_stats(&file)
            } else if unreachable {
                commands::inspect::run_unreachable(&file)
            } else if empty_targets {
                commands::inspect::run_empty_targets(&file)
            } else {
                eprintln!("Specify one of: --stats, --unreachable, --empty-targets");
                Ok(())
            }
        }
        Command::Edit { file } => commands::edit::run(&file),
    }
}
