//! syncrow CLI
//!
//! Command-line tools for inspecting and maintaining syncrow databases.
//!
//! # Commands
//!
//! - `inspect` - Display row counts of the three tables
//! - `dump` - Print the rows of one table as JSON lines
//! - `encrypt` - Encrypt rows still stored in plaintext
//! - `clean` - Drop local drafts shadowed by a remote entry

mod commands;

use clap::{Parser, Subcommand};
use commands::{CodecKind, DumpTable};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// syncrow command-line database tools.
#[derive(Parser)]
#[command(name = "syncrow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display row counts of the remote, local and deletion tables
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the rows of one table as JSON lines
    Dump {
        /// Table to dump
        #[arg(short, long, value_enum)]
        table: DumpTable,

        /// Record serialization used by the application
        #[arg(short, long, value_enum, default_value = "cbor")]
        codec: CodecKind,

        /// Secret the rows were encrypted with
        #[arg(short, long, env = "SYNCROW_SECRET", hide_env_values = true)]
        secret: Option<String>,

        /// Maximum number of rows to print
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Encrypt rows that are still stored in plaintext
    Encrypt {
        /// Secret to encrypt with
        #[arg(short, long, env = "SYNCROW_SECRET", hide_env_values = true)]
        secret: String,

        /// Record serialization used by the application
        #[arg(short, long, value_enum, default_value = "cbor")]
        codec: CodecKind,
    },

    /// Delete local drafts whose id also has a remote entry
    Clean,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = cli.path.unwrap_or_else(|| PathBuf::from("syncrow.db"));

    match cli.command {
        Commands::Inspect { format } => {
            commands::inspect::run(&path, &format)?;
        }
        Commands::Dump {
            table,
            codec,
            secret,
            limit,
        } => {
            commands::dump::run(&path, table, codec, secret.as_deref(), limit)?;
        }
        Commands::Encrypt { secret, codec } => {
            commands::encrypt::run(&path, &secret, codec)?;
        }
        Commands::Clean => {
            commands::clean::run(&path)?;
        }
        Commands::Version => {
            println!("syncrow CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("syncrow core v{}", syncrow_core::VERSION);
        }
    }

    Ok(())
}
