// Rust guideline compliant 2026-02-09

//! Tabula CLI Application
//!
//! Runs one listing operation against a listing definition and an entity
//! file, printing the JSON response envelope.

use clap::Parser;
use std::path::PathBuf;
use tabula_cli::{init_tracing, is_ok, read_payload, Workspace, WorkspaceOptions};

#[derive(Parser, Debug)]
#[command(
    name = "tabula",
    version,
    about = "Tabula: tabular listings and bulk transition resolution",
    long_about = "Tabula renders paged, searchable and sortable listings over an entity catalog and resolves the workflow transitions common to a selection.",
    after_help = "Examples:\n  tabula --listing samples.toml --entities samples.jsonl rows --payload '{\"page_size\": 20}'\n  tabula --listing samples.toml --entities samples.jsonl transitions --payload @selection.json\n  echo '{\"query\": {\"review_state\": \"received\"}}' | tabula --listing samples.toml --entities samples.jsonl query --payload -\n"
)]
struct Cli {
    /// Listing definition (TOML)
    #[arg(long, global = true, default_value = "listing.toml")]
    listing: PathBuf,

    /// Entity records (JSONL)
    #[arg(long, global = true, default_value = "entities.jsonl")]
    entities: PathBuf,

    /// Directory holding tabula.toml (defaults to the listing's directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Indexes the catalog can sort on
    #[arg(long, global = true, value_delimiter = ',')]
    sort_index: Vec<String>,

    /// Enable the full-text index
    #[arg(long, global = true)]
    text_index: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Fetch a page of rows with the transitions of the selection
    Rows {
        /// JSON payload, '@file' or '-' for stdin
        #[arg(long)]
        payload: Option<String>,
    },

    /// Resolve the transitions common to selected uids
    Transitions {
        /// JSON payload, '@file' or '-' for stdin
        #[arg(long)]
        payload: Option<String>,
    },

    /// Fetch the child rows of a parent
    Children {
        /// JSON payload, '@file' or '-' for stdin
        #[arg(long)]
        payload: Option<String>,
    },

    /// Fetch rows for a raw catalog query
    Query {
        /// JSON payload, '@file' or '-' for stdin
        #[arg(long)]
        payload: Option<String>,
    },

    /// Write fields from a save queue
    SetFields {
        /// JSON payload, '@file' or '-' for stdin
        #[arg(long)]
        payload: Option<String>,
    },

    /// Execute a transition over selected uids
    Transition {
        /// JSON payload, '@file' or '-' for stdin
        #[arg(long)]
        payload: Option<String>,
    },
}

impl Commands {
    fn operation(&self) -> (&'static str, Option<&str>) {
        match self {
            Commands::Rows { payload } => ("fetch_rows", payload.as_deref()),
            Commands::Transitions { payload } => ("fetch_transitions", payload.as_deref()),
            Commands::Children { payload } => ("fetch_children", payload.as_deref()),
            Commands::Query { payload } => ("query_rows", payload.as_deref()),
            Commands::SetFields { payload } => ("set_fields", payload.as_deref()),
            Commands::Transition { payload } => ("execute_transition", payload.as_deref()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let guard = init_tracing(&cli.log_level, cli.log_file.as_deref())?;

    let (operation, source) = cli.command.operation();
    let payload = read_payload(source)?;

    let workspace = Workspace::open(&WorkspaceOptions {
        listing: cli.listing,
        entities: cli.entities,
        config_dir: cli.config_dir,
        sort_indexes: cli.sort_index,
        text_index: cli.text_index,
    })?;

    let response = workspace.run(operation, payload)?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !is_ok(&response) {
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
