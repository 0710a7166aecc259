use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use schema_reconcile::config::{self, Config};
use schema_reconcile::utils::logging::init_logging;
use schema_reconcile::{SchemaExplorer, SchemaSnapshot, Side, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SideArg {
    Source,
    Target,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Source => Side::Source,
            SideArg::Target => Side::Target,
        }
    }
}

/// Inspect a source schema and the target schema converted from it
#[derive(Parser)]
#[command(name = "schema_reconcile", version, about)]
struct Cli {
    /// Snapshot file holding both schemas and the rate map (JSON or YAML)
    #[arg(long, short, global = true, default_value = "snapshot.json")]
    snapshot: PathBuf,

    /// Optional TOML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the object tree of one side
    Tree {
        #[arg(long, value_enum, default_value = "target")]
        side: SideArg,
        /// Case-insensitive name filter
        #[arg(long, default_value = "")]
        search: String,
        /// asc or desc; empty sorts ascending
        #[arg(long)]
        sort: Option<String>,
    },
    /// Side-by-side columns of a table
    Columns { table: String },
    /// Source foreign keys of a table with their target counterparts
    ForeignKeys { table: String },
    /// Key columns of one index on both sides
    Index { table: String, index: String },
    /// Paired check constraints of a table
    Checks { table: String },
    /// Indexes dropped from tables present on both sides
    DeletedIndexes,
    /// Summary of added, deleted and renamed objects
    Diff,
    /// Tables interleaved with the given table
    Peers { table: String },
    /// Check a proposed primary key against the interleaving layout
    ValidatePk {
        table: String,
        /// Proposed key column ids, in key order
        #[arg(required = true, value_delimiter = ',')]
        columns: Vec<String>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    init_logging(&config.logging)?;

    let snapshot = SchemaSnapshot::load(&cli.snapshot)
        .with_context(|| format!("loading snapshot {}", cli.snapshot.display()))?;
    let explorer = SchemaExplorer::new(config, snapshot)?;

    match cli.command {
        Commands::Tree { side, search, sort } => {
            let sort = sort.as_deref().map(SortOrder::parse);
            print_json(&explorer.tree(side.into(), &search, sort))
        }
        Commands::Columns { table } => print_json(&explorer.column_mapping(&table)),
        Commands::ForeignKeys { table } => print_json(&explorer.foreign_key_mapping(&table)),
        Commands::Index { table, index } => print_json(&explorer.index_mapping(&table, &index)),
        Commands::Checks { table } => print_json(&explorer.check_constraints(&table)),
        Commands::DeletedIndexes => print_json(&explorer.deleted_indexes()),
        Commands::Diff => print_json(&explorer.diff()),
        Commands::Peers { table } => print_json(&explorer.interleave_peers(&table)),
        Commands::ValidatePk { table, columns } => match explorer.validate_pk_edit(&table, &columns) {
            Ok(()) => {
                println!("ok");
                Ok(())
            }
            Err(violation) => {
                eprintln!("rejected: {}", violation);
                process::exit(2);
            }
        },
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}
