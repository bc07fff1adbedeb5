//! uiscope - query UI tree snapshots from the command line
//!
//! Every command reads one JSON snapshot and prints a JSON envelope, so
//! scripts and agents can parse failures the same way as results.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use uiscope::prelude::*;
use uiscope::QueryConfig;

#[derive(Parser)]
#[command(name = "uiscope")]
#[command(about = "uiscope - query UI accessibility tree snapshots with selectors")]
#[command(version)]
struct Cli {
    /// Snapshot file (full envelope or bare node dump)
    #[arg(short, long, global = true, env = "UISCOPE_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Deepest tree level to visit (root = 0)
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Log query steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the snapshot as a flat outline
    Tree {
        /// Maximum outline depth
        #[arg(long, default_value = "30")]
        depth: usize,
    },

    /// Count visible nodes matching a selector
    Count {
        /// Selector (e.g., "class:ListView >> desc~:Wi-Fi")
        selector: String,
    },

    /// Find the node at the selector's instance
    Find {
        /// Selector (e.g., "class:Row AND instance:2")
        selector: String,

        /// Print every match instead of one
        #[arg(long)]
        all: bool,
    },

    /// Count a container's children matching a pattern
    ChildCount {
        /// Container selector
        #[arg(long)]
        container: String,

        /// Child pattern selector
        #[arg(long)]
        pattern: String,
    },

    /// Find a container's child by its text
    ChildByText {
        /// Container selector
        #[arg(long)]
        container: String,

        /// Child pattern selector
        #[arg(long)]
        pattern: String,

        /// Exact text on the child, or contained in a descendant's text
        text: String,
    },

    /// Find a container's child by its description
    ChildByDesc {
        /// Container selector
        #[arg(long)]
        container: String,

        /// Child pattern selector
        #[arg(long)]
        pattern: String,

        /// Text contained in the child's or a descendant's description
        text: String,
    },
}

#[derive(Serialize)]
struct Output<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Error>,
}

impl<T: Serialize> Output<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(e: Error) -> Output<()> {
        Output {
            success: false,
            data: None,
            error: Some(e),
        }
    }
}

fn print_json<T: Serialize>(output: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(output)?);
    Ok(())
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let snapshot = cli.snapshot;
    let exec = Executor::with_config(QueryConfig {
        max_depth: cli.max_depth,
    });

    let result: Result<(), anyhow::Error> = match cli.command {
        Commands::Tree { depth } => {
            run_query(|| {
                let snapshot = load(snapshot.as_ref())?;
                print_json(&Output::ok(snapshot.tree(depth)))
            })
        }
        Commands::Count { selector } => {
            run_query(|| {
                let snapshot = load(snapshot.as_ref())?;
                let selector = Selector::parse(&selector)?;
                let count = exec.count(snapshot.root(), &selector)?;
                print_json(&Output::ok(serde_json::json!({
                    "selector": selector.to_string(),
                    "count": count
                })))
            })
        }
        Commands::Find { selector, all } => {
            run_query(|| {
                let snapshot = load(snapshot.as_ref())?;
                let selector = Selector::parse(&selector)?;
                if all {
                    let elements = exec.find_all(snapshot.root(), &selector)?;
                    let infos: Vec<_> = elements.iter().map(|e| e.info()).collect();
                    print_json(&Output::ok(infos))
                } else {
                    let element = exec.resolve(snapshot.root(), &selector)?;
                    print_json(&Output::ok(element.info()))
                }
            })
        }
        Commands::ChildCount { container, pattern } => {
            run_query(|| {
                let snapshot = load(snapshot.as_ref())?;
                let collection = Collection::new(Selector::parse(&container)?, &exec);
                let pattern = Selector::parse(&pattern)?;
                let count = collection.child_count(snapshot.root(), &pattern)?;
                print_json(&Output::ok(serde_json::json!({
                    "container": collection.selector().to_string(),
                    "pattern": pattern.to_string(),
                    "count": count
                })))
            })
        }
        Commands::ChildByText { container, pattern, text } => {
            run_query(|| {
                let snapshot = load(snapshot.as_ref())?;
                let collection = Collection::new(Selector::parse(&container)?, &exec);
                let pattern = Selector::parse(&pattern)?;
                let row = collection.child_by_text(snapshot.root(), &pattern, &text)?;
                print_json(&Output::ok(row.info()))
            })
        }
        Commands::ChildByDesc { container, pattern, text } => {
            run_query(|| {
                let snapshot = load(snapshot.as_ref())?;
                let collection = Collection::new(Selector::parse(&container)?, &exec);
                let pattern = Selector::parse(&pattern)?;
                let row = collection.child_by_description(snapshot.root(), &pattern, &text)?;
                print_json(&Output::ok(row.info()))
            })
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load(path: Option<&PathBuf>) -> Result<Snapshot, Error> {
    let path = path.ok_or_else(|| {
        Error::invalid_argument("snapshot", "pass --snapshot FILE or set UISCOPE_SNAPSHOT")
    })?;
    let snapshot = Snapshot::load(path)?;
    debug!(
        source = snapshot.source.as_deref().unwrap_or("-"),
        age_ms = snapshot.age().num_milliseconds(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

fn run_query<F>(f: F) -> Result<(), anyhow::Error>
where
    F: FnOnce() -> Result<(), anyhow::Error>,
{
    match f() {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some(err) = e.downcast_ref::<Error>() {
                print_json(&Output::<()>::err(err.clone()))?;
            }
            Err(e)
        }
    }
}
