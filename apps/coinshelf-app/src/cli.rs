//! # Command Line
//!
//! Argument parsing for the `coinshelf` binary.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Keeps a list of crypto and fiat currencies and searches it.
#[derive(Debug, Parser)]
#[command(name = "coinshelf", version, about)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// SQLite database file, overrides config and COINSHELF_DB_PATH
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "memory")]
    pub db: Option<PathBuf>,

    /// Keep the collection in memory only for this run
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the stored currencies, optionally filtered
    List {
        /// Search query
        #[arg(short, long)]
        query: Option<String>,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace the stored currencies with a reference dataset
    Insert {
        #[arg(value_enum)]
        dataset: Dataset,
    },

    /// Remove every stored currency
    Clear,

    /// Read queries from stdin, one keystroke state per line
    Search,

    /// Print the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    Crypto,
    Fiat,
    Both,
}
