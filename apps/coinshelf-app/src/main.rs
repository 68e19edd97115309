//! # Coinshelf Entry Point
//!
//! ## Application Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Coinshelf                                        │
//! │                                                                         │
//! │  main.rs ────► logging, argument parsing, exit code                    │
//! │                                                                         │
//! │  lib.rs ─────► config, storage, store, subcommand dispatch             │
//! │                                                                         │
//! │  commands/ ──► get_currencies, list_view, insert_*, clear_data         │
//! │                                                                         │
//! │  state/ ─────► CurrencyStore, QueryDebouncer, AppConfig                │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         SQLite Database                          │  │
//! │  │  coinshelf.db (local file, WAL mode, key_value_store table)      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::process::ExitCode;
use tracing::error;

use coinshelf_app::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    coinshelf_app::init_tracing();

    let cli = Cli::parse();

    match coinshelf_app::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = ?e.code, "{}", e.message);
            eprintln!("coinshelf: {}", e.message);
            ExitCode::FAILURE
        }
    }
}
